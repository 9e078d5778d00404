use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::validate::{
    require_at_least, require_max_items, require_non_empty, require_one_of_opt,
};

use super::ChatGpt;

const MAX_INPUTS: usize = 2048;

/// Text to embed: a single string or a batch of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Text(String),
    Many(Vec<String>),
}

impl From<&str> for EmbeddingInput {
    fn from(value: &str) -> Self {
        EmbeddingInput::Text(value.to_string())
    }
}

impl From<Vec<String>> for EmbeddingInput {
    fn from(value: Vec<String>) -> Self {
        EmbeddingInput::Many(value)
    }
}

/// Body of `POST /embeddings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: EmbeddingInput,
    /// `float` (default) or `base64`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: impl Into<EmbeddingInput>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            encoding_format: None,
            dimensions: None,
            user: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        match &self.input {
            EmbeddingInput::Text(text) => require_non_empty("input", text)?,
            EmbeddingInput::Many(texts) => {
                require_at_least("input", texts.len(), 1)?;
                require_max_items("input", texts, MAX_INPUTS)?;
                for text in texts {
                    require_non_empty("input[]", text)?;
                }
            }
        }
        require_one_of_opt(
            "encoding_format",
            self.encoding_format.as_deref(),
            &["float", "base64"],
        )?;
        if let Some(dimensions) = self.dimensions {
            require_at_least("dimensions", dimensions, 1)?;
        }
        Ok(())
    }
}

/// Embedding vector, decoded as floats or kept as the base64 string OpenAI returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingVector {
    Float(Vec<f32>),
    Base64(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub index: u32,
    pub embedding: EmbeddingVector,
    #[serde(default)]
    pub object: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingList {
    pub data: Vec<Embedding>,
    pub model: String,
    #[serde(default)]
    pub usage: Option<EmbeddingUsage>,
}

impl ChatGpt {
    /// Creates embedding vectors for the input text(s).
    pub async fn create_embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingList, ConnectorError> {
        request.validate()?;
        self.client.post("embeddings", request).await
    }
}
