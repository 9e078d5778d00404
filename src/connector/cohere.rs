//! Cohere connector: v2 chat, embed and rerank plus the v1 generate, classify and
//! tokenizer endpoints.

use std::time::Duration;

use async_trait::async_trait;

use crate::connector::{Connector, resolve_model};
use crate::error::ConnectorError;
use crate::http::{ApiClient, DynHttpTransport};
use crate::types::{Capabilities, ChatRequest, ChatResponse, FinishReason, ModelSummary, Usage};

pub mod chat;
pub mod embed;
mod error;
pub mod models;
pub mod tokenize;

pub(crate) use error::parse_cohere_error;

use chat::{CohereChatRequest, CohereMessage};

const NAME: &str = "cohere";
const DEFAULT_BASE_URL: &str = "https://api.cohere.com";

#[derive(Debug, Clone)]
pub struct Cohere {
    pub(crate) client: ApiClient,
    pub(crate) default_model: Option<String>,
}

impl Cohere {
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let client = ApiClient::new(NAME, transport, DEFAULT_BASE_URL, parse_cohere_error)
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

    /// Identifies the calling application through the `X-Client-Name` header.
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client = self.client.with_header("X-Client-Name", client_name);
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
impl Connector for Cohere {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            chat: true,
            embeddings: true,
            models: true,
            ..Capabilities::default()
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ConnectorError> {
        let model = resolve_model(NAME, &request.model, self.default_model.as_deref())?;
        let mut messages = Vec::new();
        if let Some(system) = request.system_text() {
            messages.push(CohereMessage::text("system", system));
        }
        messages.extend(
            request
                .conversation()
                .map(|message| CohereMessage::text(message.role.as_str(), &message.content)),
        );
        let chat_request = CohereChatRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            p: request.top_p,
            stop_sequences: (!request.stop.is_empty()).then(|| request.stop.clone()),
            ..CohereChatRequest::default()
        };

        let response = Cohere::chat(self, &chat_request).await?;
        let tokens = response.usage.as_ref().and_then(|usage| usage.tokens);
        Ok(ChatResponse {
            text: response.text(),
            model: Some(chat_request.model),
            finish_reason: response.finish_reason.as_deref().map(FinishReason::from_vendor),
            usage: tokens.map(|tokens| Usage {
                input_tokens: tokens.input_tokens,
                output_tokens: tokens.output_tokens,
            }),
            provider: NAME.to_string(),
            raw: serde_json::to_value(&response).ok(),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, ConnectorError> {
        let page = Cohere::list_models(self, None, None, None).await?;
        Ok(page
            .models
            .into_iter()
            .map(|model| ModelSummary {
                id: model.name,
                owned_by: Some(NAME.to_string()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::mock::MockTransport;
    use crate::types::ChatMessage;

    #[tokio::test]
    async fn connector_chat_maps_v2_response() {
        let transport = MockTransport::with_json(
            200,
            json!({
                "id": "c-1",
                "finish_reason": "COMPLETE",
                "message": {"role": "assistant", "content": [{"type": "text", "text": "Bonjour"}]},
                "usage": {
                    "billed_units": {"input_tokens": 5, "output_tokens": 2},
                    "tokens": {"input_tokens": 70, "output_tokens": 2}
                }
            }),
        );
        let cohere = Cohere::new(transport.clone(), "co-key").with_client_name("my-app");

        let request = ChatRequest::new("command-r-plus", vec![ChatMessage::user("Say hi in French")])
            .with_system("One word only.");
        let response = Connector::chat(&cohere, request).await.expect("chat");
        assert_eq!(response.text, "Bonjour");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.and_then(|u| u.input_tokens), Some(70));

        let sent = transport.last_request();
        assert_eq!(sent.url, "https://api.cohere.com/v2/chat");
        assert_eq!(sent.header("x-client-name"), Some("my-app"));
        assert_eq!(sent.json_body()["messages"][0]["role"], "system");
    }

    #[tokio::test]
    async fn connector_chat_requires_model() {
        let cohere = Cohere::new(MockTransport::new(), "co-key");
        let err = Connector::chat(&cohere, ChatRequest::new("", vec![ChatMessage::user("hi")]))
            .await
            .expect_err("no model");
        assert!(matches!(err, ConnectorError::Validation { .. }));
    }
}
