use serde::{Deserialize, Serialize};

use crate::connector::chatgpt::models::DeletedObject;
use crate::error::ConnectorError;
use crate::http::{MultipartForm, Query};
use crate::validate::{require_non_empty, require_non_empty_list, require_one_of, require_path_segment};

use super::Mistral;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralFile {
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
    pub sample_type: Option<String>,
    #[serde(default)]
    pub num_lines: Option<u64>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralFileList {
    pub data: Vec<MistralFile>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl Mistral {
    /// Uploads a file; `purpose` is `fine-tune`, `batch` or `ocr`.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        purpose: &str,
    ) -> Result<MistralFile, ConnectorError> {
        require_non_empty_list("file", &bytes)?;
        require_non_empty("filename", filename)?;
        require_one_of("purpose", purpose, &["fine-tune", "batch", "ocr"])?;
        let form = MultipartForm::new()
            .text("purpose", purpose)
            .file("file", filename, bytes, None);
        self.client.post_form("files", form).await
    }

    pub async fn list_files(&self) -> Result<MistralFileList, ConnectorError> {
        self.client.get("files", &Query::new()).await
    }

    pub async fn retrieve_file(&self, file_id: &str) -> Result<MistralFile, ConnectorError> {
        require_path_segment("file_id", file_id)?;
        self.client
            .get(&format!("files/{file_id}"), &Query::new())
            .await
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<DeletedObject, ConnectorError> {
        require_path_segment("file_id", file_id)?;
        self.client.delete(&format!("files/{file_id}")).await
    }
}
