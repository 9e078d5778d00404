use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::connector::chatgpt::chat::{ChatCompletion, ChatCompletionMessage};
use crate::error::ConnectorError;
use crate::validate::{
    reject_streaming, require_non_empty, require_non_empty_list, require_one_of,
    require_range_opt,
};

use super::Mistral;

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MistralChatRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Prepends Mistral's guardrail system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_prompt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MistralChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Self::default()
        }
    }

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
        require_range_opt("temperature", self.temperature, 0.0, 1.5)?;
        require_range_opt("top_p", self.top_p, 0.0, 1.0)?;
        require_range_opt("presence_penalty", self.presence_penalty, -2.0, 2.0)?;
        require_range_opt("frequency_penalty", self.frequency_penalty, -2.0, 2.0)?;
        reject_streaming(self.stream)
    }
}

/// Body of `POST /fim/completions` (fill-in-the-middle for Codestral).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FimRequest {
    pub model: String,
    pub prompt: String,
    /// Code after the cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl FimRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        require_non_empty("prompt", &self.prompt)?;
        require_range_opt("temperature", self.temperature, 0.0, 1.5)?;
        require_range_opt("top_p", self.top_p, 0.0, 1.0)?;
        if let (Some(min), Some(max)) = (self.min_tokens, self.max_tokens) {
            if min > max {
                return Err(ConnectorError::validation(
                    "`min_tokens` must not exceed `max_tokens`",
                ));
            }
        }
        reject_streaming(self.stream)
    }
}

impl Mistral {
    pub async fn chat_completion(
        &self,
        request: &MistralChatRequest,
    ) -> Result<ChatCompletion, ConnectorError> {
        request.validate()?;
        self.client.post("chat/completions", request).await
    }

    /// Completes code between `prompt` and `suffix`.
    pub async fn fim_completion(&self, request: &FimRequest) -> Result<ChatCompletion, ConnectorError> {
        request.validate()?;
        self.client.post("fim/completions", request).await
    }
}
