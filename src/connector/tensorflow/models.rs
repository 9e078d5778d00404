use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConnectorError;
use crate::http::Query;

use super::{ModelRef, TensorFlow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetail {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersionStatus {
    /// Version number, serialized by TensorFlow Serving as a string.
    pub version: String,
    /// `START`, `LOADING`, `AVAILABLE`, `UNLOADING` or `END`.
    pub state: String,
    #[serde(default)]
    pub status: Option<StatusDetail>,
}

impl ModelVersionStatus {
    pub fn is_available(&self) -> bool {
        self.state == "AVAILABLE"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    #[serde(default)]
    pub model_version_status: Vec<ModelVersionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    #[serde(default)]
    pub signature_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_spec: ModelSpec,
    /// Usually `{"signature_def": {...}}`.
    #[serde(default)]
    pub metadata: Value,
}

impl ModelMetadata {
    /// Names of the exported signatures, sorted.
    pub fn signature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .metadata
            .pointer("/signature_def/signature_def")
            .and_then(Value::as_object)
            .map(|defs| defs.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl TensorFlow {
    /// Reports the load state of every version of a model.
    pub async fn model_status(&self, model: &ModelRef) -> Result<ModelStatus, ConnectorError> {
        let path = model.path()?;
        self.client.get(&path, &Query::new()).await
    }

    /// Returns the signature definitions of a model.
    pub async fn model_metadata(&self, model: &ModelRef) -> Result<ModelMetadata, ConnectorError> {
        let path = model.path()?;
        self.client
            .get(&format!("{path}/metadata"), &Query::new())
            .await
    }
}
