use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::connector::chatgpt::models::DeletedObject;
use crate::error::ConnectorError;
use crate::http::Query;
use crate::validate::{require_max_len, require_path_segment};

use super::Mistral;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralModel {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_context_length: Option<u64>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub capabilities: Option<Value>,
    /// `base` or `fine-tuned`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralModelList {
    #[serde(default)]
    pub object: Option<String>,
    pub data: Vec<MistralModel>,
}

/// Body of `PATCH /fine_tuning/models/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Mistral {
    pub async fn list_models(&self) -> Result<MistralModelList, ConnectorError> {
        self.client.get("models", &Query::new()).await
    }

    pub async fn retrieve_model(&self, model_id: &str) -> Result<MistralModel, ConnectorError> {
        require_path_segment("model_id", model_id)?;
        self.client
            .get(&format!("models/{model_id}"), &Query::new())
            .await
    }

    /// Deletes a fine-tuned model.
    pub async fn delete_model(&self, model_id: &str) -> Result<DeletedObject, ConnectorError> {
        require_path_segment("model_id", model_id)?;
        self.client.delete(&format!("models/{model_id}")).await
    }

    /// Renames or re-describes a fine-tuned model.
    pub async fn update_model(
        &self,
        model_id: &str,
        request: &UpdateModelRequest,
    ) -> Result<MistralModel, ConnectorError> {
        require_path_segment("model_id", model_id)?;
        if request.name.is_none() && request.description.is_none() {
            return Err(ConnectorError::validation(
                "one of `name` or `description` is required",
            ));
        }
        if let Some(name) = &request.name {
            require_max_len("name", name, 64)?;
        }
        self.client
            .patch(&format!("fine_tuning/models/{model_id}"), request)
            .await
    }
}
