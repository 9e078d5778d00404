//! OpenAI image generation (DALL-E 2 and DALL-E 3).

use std::time::Duration;

use async_trait::async_trait;

use crate::connector::Connector;
use crate::connector::chatgpt::{DEFAULT_BASE_URL, parse_openai_error};
use crate::http::{ApiClient, DynHttpTransport};
use crate::types::Capabilities;

pub mod images;

const NAME: &str = "dalle";

/// Image connector sharing the OpenAI endpoint and credentials with [`super::ChatGpt`].
#[derive(Debug, Clone)]
pub struct Dalle {
    pub(crate) client: ApiClient,
}

impl Dalle {
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let client = ApiClient::new(NAME, transport, DEFAULT_BASE_URL, parse_openai_error)
            .with_header("Authorization", format!("Bearer {}", api_key.into()));
        Self { client }
    }

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

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl Connector for Dalle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            images: true,
            ..Capabilities::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use crate::http::mock::MockTransport;
    use crate::types::{ChatMessage, ChatRequest};

    #[tokio::test]
    async fn chat_is_unsupported() {
        let dalle = Dalle::new(MockTransport::new(), "sk-test");
        let err = dalle
            .chat(ChatRequest::new("dall-e-3", vec![ChatMessage::user("hi")]))
            .await
            .expect_err("unsupported");
        assert!(matches!(
            err,
            ConnectorError::Unsupported {
                provider: "dalle",
                feature: "chat"
            }
        ));
        assert!(dalle.capabilities().images);
    }
}
