//! OpenAI connector covering chat, embeddings, moderation, audio, files, fine-tuning
//! and model management.

use std::time::Duration;

use async_trait::async_trait;

use crate::connector::{Connector, resolve_model};
use crate::error::ConnectorError;
use crate::http::{ApiClient, DynHttpTransport};
use crate::types::{Capabilities, ChatRequest, ChatResponse, FinishReason, ModelSummary, Usage};

pub mod audio;
pub mod chat;
pub mod embeddings;
mod error;
pub mod files;
pub mod fine_tuning;
pub mod models;
pub mod moderation;

pub(crate) use error::parse_openai_error;

use chat::{ChatCompletionMessage, ChatCompletionRequest};

const NAME: &str = "chatgpt";
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI REST connector.
///
/// # Examples
///
/// ```
/// # use ai_connectors::connector::{ChatGpt, Connector};
/// # use ai_connectors::http::reqwest::default_dyn_transport;
/// let transport = default_dyn_transport().expect("transport");
/// let chatgpt = ChatGpt::new(transport, "sk-test")
///     .with_organization("org_123")
///     .with_default_model("gpt-4o-mini");
/// assert_eq!(chatgpt.name(), "chatgpt");
/// assert_eq!(chatgpt.client().header("OpenAI-Organization"), Some("org_123"));
/// ```
#[derive(Debug, Clone)]
pub struct ChatGpt {
    pub(crate) client: ApiClient,
    pub(crate) default_model: Option<String>,
}

impl ChatGpt {
    /// Creates a connector targeting `https://api.openai.com/v1`.
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let client = ApiClient::new(NAME, transport, DEFAULT_BASE_URL, parse_openai_error)
            .with_header("Authorization", format!("Bearer {}", api_key.into()));
        Self {
            client,
            default_model: None,
        }
    }

    /// Overrides the base URL, useful for proxies or Azure-style gateways.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    /// Sets the `OpenAI-Organization` header.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.client = self.client.with_header("OpenAI-Organization", organization);
        self
    }

    /// Sets the `OpenAI-Project` header.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.client = self.client.with_header("OpenAI-Project", project);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Model used by [`Connector::chat`] when the request leaves it empty.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn to_completion_request(request: &ChatRequest, model: String) -> ChatCompletionRequest {
    let mut messages = Vec::new();
    if let Some(system) = request.system_text() {
        messages.push(ChatCompletionMessage::text("system", system));
    }
    messages.extend(
        request
            .conversation()
            .map(|message| ChatCompletionMessage::text(message.role.as_str(), &message.content)),
    );
    ChatCompletionRequest {
        model,
        messages,
        temperature: request.temperature,
        top_p: request.top_p,
        max_tokens: request.max_tokens,
        stop: (!request.stop.is_empty()).then(|| request.stop.clone()),
        ..ChatCompletionRequest::default()
    }
}

#[async_trait]
impl Connector for ChatGpt {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            chat: true,
            embeddings: true,
            images: false,
            audio: true,
            files: true,
            models: true,
            inference: false,
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ConnectorError> {
        let model = resolve_model(NAME, &request.model, self.default_model.as_deref())?;
        let completion = self
            .create_chat_completion(&to_completion_request(&request, model))
            .await?;
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
        let models = ChatGpt::list_models(self).await?;
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
