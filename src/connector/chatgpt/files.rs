use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::{MultipartForm, Query};
use crate::validate::{
    require_non_empty, require_non_empty_list, require_one_of, require_one_of_opt,
    require_path_segment,
};

use super::ChatGpt;
use super::models::DeletedObject;

const PURPOSES: [&str; 6] = ["assistants", "batch", "fine-tune", "vision", "user_data", "evals"];

/// Metadata of a file stored on the OpenAI platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub created_at: Option<u64>,
    pub filename: String,
    pub purpose: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileList {
    pub data: Vec<FileObject>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

/// Raw file content downloaded from `/files/{id}/content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ChatGpt {
    /// Uploads a file for use with fine-tuning, batches or assistants.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        purpose: &str,
    ) -> Result<FileObject, ConnectorError> {
        require_non_empty_list("file", &bytes)?;
        require_non_empty("filename", filename)?;
        require_one_of("purpose", purpose, &PURPOSES)?;
        let form = MultipartForm::new()
            .text("purpose", purpose)
            .file("file", filename, bytes, None);
        self.client.post_form("files", form).await
    }

    /// Lists uploaded files, optionally filtered by purpose.
    pub async fn list_files(&self, purpose: Option<&str>) -> Result<FileList, ConnectorError> {
        require_one_of_opt("purpose", purpose, &PURPOSES)?;
        self.client
            .get("files", &Query::new().push_opt("purpose", purpose))
            .await
    }

    pub async fn retrieve_file(&self, file_id: &str) -> Result<FileObject, ConnectorError> {
        require_path_segment("file_id", file_id)?;
        self.client
            .get(&format!("files/{file_id}"), &Query::new())
            .await
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<DeletedObject, ConnectorError> {
        require_path_segment("file_id", file_id)?;
        self.client.delete(&format!("files/{file_id}")).await
    }

    /// Downloads the stored bytes of a file.
    pub async fn retrieve_file_content(
        &self,
        file_id: &str,
    ) -> Result<FileContent, ConnectorError> {
        require_path_segment("file_id", file_id)?;
        let response = self
            .client
            .get_full(&format!("files/{file_id}/content"), &Query::new())
            .await?;
        let content_type = response.header("content-type").map(str::to_string);
        Ok(FileContent {
            bytes: response.body,
            content_type,
        })
    }
}
