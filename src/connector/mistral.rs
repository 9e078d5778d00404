//! Mistral La Plateforme connector.
//!
//! The chat and embedding schemas are OpenAI-compatible, so the response types from
//! [`super::chatgpt`] are reused where the payloads are identical.

use std::time::Duration;

use async_trait::async_trait;

use crate::connector::chatgpt::chat::ChatCompletionMessage;
use crate::connector::{Connector, resolve_model};
use crate::error::ConnectorError;
use crate::http::{ApiClient, DynHttpTransport};
use crate::types::{Capabilities, ChatRequest, ChatResponse, FinishReason, ModelSummary, Usage};

pub mod chat;
pub mod embeddings;
mod error;
pub mod files;
pub mod models;

pub(crate) use error::parse_mistral_error;

use chat::MistralChatRequest;

const NAME: &str = "mistral";
const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

#[derive(Debug, Clone)]
pub struct Mistral {
    pub(crate) client: ApiClient,
    pub(crate) default_model: Option<String>,
}

impl Mistral {
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let client = ApiClient::new(NAME, transport, DEFAULT_BASE_URL, parse_mistral_error)
            .with_header("Authorization", format!("Bearer {}", api_key.into()));
        Self {
            client,
            default_model: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
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

#[async_trait]
impl Connector for Mistral {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            chat: true,
            embeddings: true,
            files: true,
            models: true,
            ..Capabilities::default()
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ConnectorError> {
        let model = resolve_model(NAME, &request.model, self.default_model.as_deref())?;
        let mut messages = Vec::new();
        if let Some(system) = request.system_text() {
            messages.push(ChatCompletionMessage::text("system", system));
        }
        messages.extend(
            request
                .conversation()
                .map(|message| ChatCompletionMessage::text(message.role.as_str(), &message.content)),
        );
        let chat_request = MistralChatRequest {
            model,
            messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
            stop: (!request.stop.is_empty()).then(|| request.stop.clone()),
            ..MistralChatRequest::default()
        };

        let completion = self.chat_completion(&chat_request).await?;
        let raw = serde_json::to_value(&completion).ok();
        let choice = completion.choices.first();
        Ok(ChatResponse {
            text: choice
                .and_then(|choice| choice.message.text_content())
                .unwrap_or_default(),
            model: Some(completion.model.clone()),
            finish_reason: choice
                .and_then(|choice| choice.finish_reason.as_deref())
                .map(FinishReason::from_vendor),
            usage: completion.usage.as_ref().map(|usage| Usage {
                input_tokens: Some(usage.prompt_tokens),
                output_tokens: Some(usage.completion_tokens),
            }),
            provider: NAME.to_string(),
            raw,
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, ConnectorError> {
        let models = Mistral::list_models(self).await?;
        Ok(models
            .data
            .into_iter()
            .map(|model| ModelSummary {
                id: model.id,
                owned_by: model.owned_by,
            })
            .collect())
    }
}
