use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConnectorError;
use crate::validate::{
    reject_streaming, require_at_least, require_max_items, require_non_empty,
    require_non_empty_list, require_one_of, require_range_opt,
};

use super::Cohere;

/// Chat message for the v2 API. `content` is a string or an array of content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl CohereMessage {
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(Value::String(text.into())),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// Body of `POST /v2/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereChatRequest {
    pub model: String,
    pub messages: Vec<CohereMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CohereChatRequest {
    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        require_non_empty_list("messages", &self.messages)?;
        for message in &self.messages {
            require_one_of(
                "messages[].role",
                &message.role,
                &["system", "user", "assistant", "tool"],
            )?;
        }
        require_range_opt("temperature", self.temperature, 0.0, 1.0)?;
        require_range_opt("p", self.p, 0.01, 0.99)?;
        require_range_opt("k", self.k, 0, 500)?;
        require_range_opt("frequency_penalty", self.frequency_penalty, 0.0, 1.0)?;
        require_range_opt("presence_penalty", self.presence_penalty, 0.0, 1.0)?;
        if let Some(stop) = &self.stop_sequences {
            require_max_items("stop_sequences", stop, 5)?;
        }
        reject_streaming(self.stream)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereUsage {
    #[serde(default)]
    pub billed_units: Option<TokenCounts>,
    #[serde(default)]
    pub tokens: Option<TokenCounts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereChatResponse {
    pub id: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
    pub message: CohereMessage,
    #[serde(default)]
    pub usage: Option<CohereUsage>,
}

impl CohereChatResponse {
    /// Text of the assistant message with every text block concatenated.
    pub fn text(&self) -> String {
        match &self.message.content {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(blocks)) => blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect(),
            _ => String::new(),
        }
    }
}

/// Body of `POST /v1/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_generations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("prompt", &self.prompt)?;
        if let Some(max_tokens) = self.max_tokens {
            require_at_least("max_tokens", max_tokens, 1)?;
        }
        require_range_opt("temperature", self.temperature, 0.0, 5.0)?;
        require_range_opt("k", self.k, 0, 500)?;
        require_range_opt("p", self.p, 0.0, 0.99)?;
        require_range_opt("num_generations", self.num_generations, 1, 5)?;
        if let Some(truncate) = &self.truncate {
            require_one_of("truncate", truncate, &["NONE", "START", "END"])?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: String,
    pub generations: Vec<Generation>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl Cohere {
    /// Generates a reply through the v2 chat endpoint.
    pub async fn chat(
        &self,
        request: &CohereChatRequest,
    ) -> Result<CohereChatResponse, ConnectorError> {
        request.validate()?;
        self.client.post("v2/chat", request).await
    }

    /// Legacy prompt completion (`/v1/generate`).
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ConnectorError> {
        request.validate()?;
        self.client.post("v1/generate", request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::mock::MockTransport;

    #[tokio::test]
    async fn generate_posts_to_v1() {
        let transport = MockTransport::with_json(
            200,
            json!({
                "id": "gen-1",
                "generations": [{"id": "g0", "text": " world", "finish_reason": "COMPLETE"}],
                "prompt": "hello"
            }),
        );
        let cohere = Cohere::new(transport.clone(), "co-key");

        let mut request = GenerateRequest::new("hello");
        request.num_generations = Some(1);
        request.k = Some(0);
        let response = cohere.generate(&request).await.expect("generate");
        assert_eq!(response.generations[0].text, " world");
        let sent = transport.last_request();
        assert_eq!(sent.url, "https://api.cohere.com/v1/generate");
        assert_eq!(sent.json_body(), json!({"prompt": "hello", "num_generations": 1, "k": 0}));
    }

    #[test]
    fn generate_ranges() {
        let mut request = GenerateRequest::new("x");
        request.temperature = Some(5.0);
        assert!(request.validate().is_ok());
        request.temperature = Some(5.1);
        assert!(request.validate().is_err());

        let mut request = GenerateRequest::new("x");
        request.num_generations = Some(6);
        assert!(request.validate().is_err());

        let mut request = GenerateRequest::new("x");
        request.p = Some(1.0);
        assert!(request.validate().is_err());

        assert!(GenerateRequest::new(" ").validate().is_err());
    }

    #[tokio::test]
    async fn chat_rejects_unknown_roles_and_streaming() {
        let cohere = Cohere::new(MockTransport::new(), "co-key");
        let mut request = CohereChatRequest {
            model: "command-r".to_string(),
            messages: vec![CohereMessage::text("chatbot", "hi")],
            ..CohereChatRequest::default()
        };
        assert!(cohere.chat(&request).await.is_err());

        request.messages = vec![CohereMessage::text("user", "hi")];
        request.stream = Some(true);
        assert!(cohere.chat(&request).await.is_err());
    }

    #[test]
    fn response_text_skips_non_text_blocks() {
        let response: CohereChatResponse = serde_json::from_value(json!({
            "id": "c",
            "message": {"role": "assistant", "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "a"},
                {"type": "text", "text": "b"}
            ]}
        }))
        .expect("response");
        assert_eq!(response.text(), "ab");
    }
}
