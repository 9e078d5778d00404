use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConnectorError;
use crate::validate::{require_exactly_one, require_non_empty_list};

use super::{ModelRef, TensorFlow};

/// Body of `:predict`, in row (`instances`) or columnar (`inputs`) format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
}

impl PredictRequest {
    pub fn instances(instances: Vec<Value>) -> Self {
        Self {
            instances: Some(instances),
            ..Self::default()
        }
    }

    pub fn inputs(inputs: Value) -> Self {
        Self {
            inputs: Some(inputs),
            ..Self::default()
        }
    }

    pub fn with_signature(mut self, signature_name: impl Into<String>) -> Self {
        self.signature_name = Some(signature_name.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_exactly_one(
            "instances",
            self.instances.is_some(),
            "inputs",
            self.inputs.is_some(),
        )?;
        if let Some(instances) = &self.instances {
            require_non_empty_list("instances", instances)?;
        }
        Ok(())
    }
}

/// Row format answers with `predictions`, columnar format with `outputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Option<Value>,
    #[serde(default)]
    pub outputs: Option<Value>,
}

/// Body of `:classify` and `:regress`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_name: Option<String>,
    /// Features shared by every example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    pub examples: Vec<Map<String, Value>>,
}

impl ExampleRequest {
    pub fn new(examples: Vec<Map<String, Value>>) -> Self {
        Self {
            examples,
            ..Self::default()
        }
    }
}

/// Per example, the `(label, score)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub result: Vec<Vec<(String, f64)>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressResponse {
    pub result: Vec<f64>,
}

impl TensorFlow {
    /// Runs the model's predict signature.
    pub async fn predict(
        &self,
        model: &ModelRef,
        request: &PredictRequest,
    ) -> Result<PredictResponse, ConnectorError> {
        let path = model.path()?;
        request.validate()?;
        self.client.post(&format!("{path}:predict"), request).await
    }

    pub async fn classify(
        &self,
        model: &ModelRef,
        request: &ExampleRequest,
    ) -> Result<ClassifyResponse, ConnectorError> {
        let path = model.path()?;
        require_non_empty_list("examples", &request.examples)?;
        self.client.post(&format!("{path}:classify"), request).await
    }

    pub async fn regress(
        &self,
        model: &ModelRef,
        request: &ExampleRequest,
    ) -> Result<RegressResponse, ConnectorError> {
        let path = model.path()?;
        require_non_empty_list("examples", &request.examples)?;
        self.client.post(&format!("{path}:regress"), request).await
    }
}
