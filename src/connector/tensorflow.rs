//! TensorFlow Serving REST connector.

use std::time::Duration;

use async_trait::async_trait;

use crate::connector::Connector;
use crate::error::ConnectorError;
use crate::http::{ApiClient, DynHttpTransport};
use crate::types::Capabilities;
use crate::validate::{require_at_most_one, require_path_segment};

mod error;
pub mod inference;
pub mod models;

pub(crate) use error::parse_serving_error;

const NAME: &str = "tensorflow";
const DEFAULT_BASE_URL: &str = "http://localhost:8501/v1";

/// Addresses a served model, optionally pinned to a version or a version label.
///
/// # Examples
///
/// ```
/// use ai_connectors::connector::tensorflow::ModelRef;
///
/// assert_eq!(ModelRef::new("resnet").path().unwrap(), "models/resnet");
/// assert_eq!(
///     ModelRef::new("resnet").with_version(3).path().unwrap(),
///     "models/resnet/versions/3"
/// );
/// assert!(ModelRef::new("resnet").with_version(3).with_label("stable").path().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub name: String,
    pub version: Option<u64>,
    pub label: Option<String>,
}

impl ModelRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            label: None,
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validates the reference and renders its URL path.
    pub fn path(&self) -> Result<String, ConnectorError> {
        require_path_segment("model name", &self.name)?;
        require_at_most_one(
            "version",
            self.version.is_some(),
            "label",
            self.label.is_some(),
        )?;
        let mut path = format!("models/{}", self.name);
        if let Some(version) = self.version {
            path.push_str(&format!("/versions/{version}"));
        }
        if let Some(label) = &self.label {
            require_path_segment("label", label)?;
            path.push_str(&format!("/labels/{label}"));
        }
        Ok(path)
    }
}

/// Connector for a TensorFlow Serving instance. No credential is needed by default;
/// a bearer token can be added for deployments behind an authenticating gateway.
#[derive(Debug, Clone)]
pub struct TensorFlow {
    pub(crate) client: ApiClient,
}

impl TensorFlow {
    pub fn new(transport: DynHttpTransport) -> Self {
        Self {
            client: ApiClient::new(NAME, transport, DEFAULT_BASE_URL, parse_serving_error),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.client = self
            .client
            .with_header("Authorization", format!("Bearer {}", token.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl Connector for TensorFlow {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            inference: true,
            ..Capabilities::default()
        }
    }
}
