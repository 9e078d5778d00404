//! Provider-agnostic types shared by the uniform [`crate::connector::Connector`] surface.
//!
//! Connectors expose their full native APIs with vendor-shaped request structs; these
//! types only cover the common denominator (plain-text chat and model listing) so
//! applications can switch providers through [`crate::hub::ConnectorHub`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat role understood by every chat-capable connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Single plain-text chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat request shared across all chat-capable connectors.
///
/// System instructions may be given either as `system` or as leading
/// [`Role::System`] messages; connectors fold them into whatever their API expects.
///
/// # Examples
///
/// ```
/// # use ai_connectors::types::{ChatMessage, ChatRequest};
/// let request = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("Summarize Rust traits.")])
///     .with_system("You are concise.")
///     .with_max_tokens(200);
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.max_tokens, Some(200));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier; connectors fall back to their configured default when empty.
    #[serde(default)]
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub stop: Vec<String>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Joins `system` and every system-role message into one instruction block.
    pub(crate) fn system_text(&self) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(system) = &self.system {
            parts.push(system);
        }
        parts.extend(
            self.messages
                .iter()
                .filter(|message| message.role == Role::System)
                .map(|message| message.content.as_str()),
        );
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// Messages without the system role.
    pub(crate) fn conversation(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(|message| message.role != Role::System)
    }
}

/// Why a chat response stopped generating content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Other(String),
}

impl FinishReason {
    /// Maps the vendor spellings (`stop`, `end_turn`, `COMPLETE`, `max_tokens`, ...).
    pub fn from_vendor(reason: &str) -> Self {
        match reason.to_ascii_lowercase().as_str() {
            "stop" | "end_turn" | "complete" | "stop_sequence" => FinishReason::Stop,
            "length" | "max_tokens" | "model_length" => FinishReason::Length,
            "tool_calls" | "tool_use" | "tool_call" => FinishReason::ToolCalls,
            "content_filter" | "error_toxic" | "refusal" => FinishReason::ContentFilter,
            _ => FinishReason::Other(reason.to_string()),
        }
    }
}

/// Token usage accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Normalized chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Concatenated assistant text.
    pub text: String,
    pub model: Option<String>,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<Usage>,
    /// Connector name such as `claude`.
    pub provider: String,
    /// Raw vendor payload for debugging.
    pub raw: Option<Value>,
}

/// Model entry returned by [`crate::connector::Connector::list_models`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: String,
    pub owned_by: Option<String>,
}

/// Capability descriptor used to filter connectors at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub chat: bool,
    pub embeddings: bool,
    pub images: bool,
    pub audio: bool,
    pub files: bool,
    pub models: bool,
    /// Raw tensor inference, as served by TensorFlow Serving.
    pub inference: bool,
}
