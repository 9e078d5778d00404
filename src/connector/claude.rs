//! Anthropic Messages API connector.

use std::time::Duration;

use async_trait::async_trait;

use crate::connector::{Connector, resolve_model};
use crate::error::ConnectorError;
use crate::http::{ApiClient, DynHttpTransport};
use crate::types::{Capabilities, ChatRequest, ChatResponse, FinishReason, ModelSummary, Usage};

mod error;
pub mod messages;
pub mod models;

pub(crate) use error::parse_anthropic_error;

use messages::{MessageParam, MessageRequest, SystemPrompt};

const NAME: &str = "claude";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_VERSION: &str = "2023-06-01";
/// `max_tokens` is mandatory for Anthropic; used when a [`ChatRequest`] leaves it unset.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic connector (Claude 3.x and later Messages API).
#[derive(Debug, Clone)]
pub struct Claude {
    pub(crate) client: ApiClient,
    pub(crate) default_model: Option<String>,
}

impl Claude {
    /// Creates a connector using the default base URL and `anthropic-version`.
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let client = ApiClient::new(NAME, transport, DEFAULT_BASE_URL, parse_anthropic_error)
            .with_header("x-api-key", api_key)
            .with_header("anthropic-version", DEFAULT_VERSION);
        Self {
            client,
            default_model: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    /// Overrides the `anthropic-version` header.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.client = self.client.with_header("anthropic-version", version);
        self
    }

    /// Sets the `anthropic-beta` header; accepts a comma-separated list of betas.
    pub fn with_beta(mut self, beta: impl Into<String>) -> Self {
        self.client = self.client.with_header("anthropic-beta", beta);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn to_message_request(request: &ChatRequest, model: String) -> MessageRequest {
    let messages = request
        .conversation()
        .map(|message| MessageParam::text(message.role.as_str(), &message.content))
        .collect();
    MessageRequest {
        model,
        messages,
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: request.system_text().map(SystemPrompt::Text),
        temperature: request.temperature,
        top_p: request.top_p,
        stop_sequences: (!request.stop.is_empty()).then(|| request.stop.clone()),
        ..MessageRequest::default()
    }
}

#[async_trait]
impl Connector for Claude {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            chat: true,
            models: true,
            ..Capabilities::default()
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ConnectorError> {
        let model = resolve_model(NAME, &request.model, self.default_model.as_deref())?;
        let message = self
            .create_message(&to_message_request(&request, model))
            .await?;
        Ok(ChatResponse {
            text: message.text(),
            model: Some(message.model.clone()),
            finish_reason: message.stop_reason.as_deref().map(FinishReason::from_vendor),
            usage: Some(Usage {
                input_tokens: Some(message.usage.input_tokens),
                output_tokens: Some(message.usage.output_tokens),
            }),
            provider: NAME.to_string(),
            raw: serde_json::to_value(&message).ok(),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, ConnectorError> {
        let page = Claude::list_models(self, None, None, None).await?;
        Ok(page
            .data
            .into_iter()
            .map(|model| ModelSummary {
                id: model.id,
                owned_by: Some("anthropic".to_string()),
            })
            .collect())
    }
}
