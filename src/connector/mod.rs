use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ConnectorError;
use crate::types::{Capabilities, ChatRequest, ChatResponse, ModelSummary};

pub mod chatgpt;
pub mod claude;
pub mod cohere;
pub mod dalle;
pub mod mistral;
pub mod stability;
pub mod tensorflow;

pub use chatgpt::ChatGpt;
pub use claude::Claude;
pub use cohere::Cohere;
pub use dalle::Dalle;
pub use mistral::Mistral;
pub use stability::Stability;
pub use tensorflow::TensorFlow;

/// Uniform surface shared by every connector.
///
/// Each connector also exposes its vendor's full API as inherent methods; this trait
/// only covers what can be expressed identically across vendors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connector name, used as the provider tag on errors.
    fn name(&self) -> &'static str;

    /// Describes the operation families this connector offers.
    fn capabilities(&self) -> Capabilities;

    /// Sends a plain-text chat request.
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, ConnectorError> {
        Err(ConnectorError::Unsupported {
            provider: self.name(),
            feature: "chat",
        })
    }

    /// Lists the models available to the configured credential.
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ConnectorError> {
        Err(ConnectorError::Unsupported {
            provider: self.name(),
            feature: "model listing",
        })
    }
}

/// Thread-safe connector handle.
pub type DynConnector = Arc<dyn Connector>;

/// Picks the request model, falling back to the connector default.
pub(crate) fn resolve_model(
    provider: &'static str,
    requested: &str,
    default_model: Option<&str>,
) -> Result<String, ConnectorError> {
    if !requested.trim().is_empty() {
        return Ok(requested.to_string());
    }
    default_model
        .map(str::to_string)
        .ok_or_else(|| ConnectorError::validation(format!("model is required for {provider}")))
}
