use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::connector::chatgpt::embeddings::{EmbeddingInput, EmbeddingList};
use crate::error::ConnectorError;
use crate::validate::{require_non_empty, require_non_empty_list, require_one_of_opt};

use super::Mistral;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralEmbeddingRequest {
    pub model: String,
    pub input: EmbeddingInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimension: Option<u32>,
    /// `float`, `int8`, `uint8`, `binary` or `ubinary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dtype: Option<String>,
}

impl MistralEmbeddingRequest {
    pub fn new(model: impl Into<String>, input: impl Into<EmbeddingInput>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            output_dimension: None,
            output_dtype: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        validate_input(&self.input)?;
        require_one_of_opt(
            "output_dtype",
            self.output_dtype.as_deref(),
            &["float", "int8", "uint8", "binary", "ubinary"],
        )
    }
}

fn validate_input(input: &EmbeddingInput) -> Result<(), ConnectorError> {
    match input {
        EmbeddingInput::Text(text) => require_non_empty("input", text),
        EmbeddingInput::Many(texts) => require_non_empty_list("input", texts),
    }
}

/// Body of `POST /moderations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRequest {
    pub model: String,
    pub input: EmbeddingInput,
}

impl ModerationRequest {
    pub fn new(model: impl Into<String>, input: impl Into<EmbeddingInput>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModerationResult {
    #[serde(default)]
    pub categories: HashMap<String, bool>,
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,
}

impl ModerationResult {
    pub fn is_flagged(&self) -> bool {
        self.categories.values().any(|flagged| *flagged)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub id: String,
    pub model: String,
    pub results: Vec<ModerationResult>,
}

impl Mistral {
    pub async fn create_embeddings(
        &self,
        request: &MistralEmbeddingRequest,
    ) -> Result<EmbeddingList, ConnectorError> {
        request.validate()?;
        self.client.post("embeddings", request).await
    }

    /// Classifies text against Mistral's moderation categories.
    pub async fn moderate(
        &self,
        request: &ModerationRequest,
    ) -> Result<ModerationResponse, ConnectorError> {
        require_non_empty("model", &request.model)?;
        validate_input(&request.input)?;
        self.client.post("moderations", request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connector::chatgpt::embeddings::EmbeddingVector;
    use crate::http::mock::MockTransport;

    #[tokio::test]
    async fn create_embeddings_decodes_openai_shape() {
        let transport = MockTransport::with_json(
            200,
            json!({
                "id": "emb-1",
                "object": "list",
                "data": [{"object": "embedding", "embedding": [0.5, 0.25], "index": 0}],
                "model": "mistral-embed",
                "usage": {"prompt_tokens": 3, "total_tokens": 3, "completion_tokens": 0}
            }),
        );
        let mistral = Mistral::new(transport.clone(), "ms-key");

        let list = mistral
            .create_embeddings(&MistralEmbeddingRequest::new(
                "mistral-embed",
                vec!["a".to_string()],
            ))
            .await
            .expect("embeddings");
        assert_eq!(list.data[0].embedding, EmbeddingVector::Float(vec![0.5, 0.25]));
        assert_eq!(transport.last_request().json_body()["input"], json!(["a"]));
    }

    #[tokio::test]
    async fn moderate_flags_categories() {
        let transport = MockTransport::with_json(
            200,
            json!({
                "id": "mod-1",
                "model": "mistral-moderation-latest",
                "results": [{"categories": {"sexual": false, "pii": true}, "category_scores": {"sexual": 0.01, "pii": 0.8}}]
            }),
        );
        let mistral = Mistral::new(transport.clone(), "ms-key");

        let response = mistral
            .moderate(&ModerationRequest::new("mistral-moderation-latest", "my ssn is ..."))
            .await
            .expect("moderation");
        assert!(response.results[0].is_flagged());
        assert!(transport.last_request().url.ends_with("/moderations"));

        assert!(
            mistral
                .moderate(&ModerationRequest::new("mistral-moderation-latest", ""))
                .await
                .is_err()
        );
    }
}
