use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConnectorError;
use crate::validate::{require_non_empty, require_non_empty_list};

use super::ChatGpt;
use super::embeddings::EmbeddingInput;

/// Body of `POST /moderations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRequest {
    pub input: EmbeddingInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ModerationRequest {
    pub fn new(input: impl Into<EmbeddingInput>) -> Self {
        Self {
            input: input.into(),
            model: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        match &self.input {
            EmbeddingInput::Text(text) => require_non_empty("input", text),
            EmbeddingInput::Many(texts) => require_non_empty_list("input", texts),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: HashMap<String, bool>,
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,
    #[serde(default)]
    pub category_applied_input_types: Option<Value>,
}

impl ModerationResult {
    /// Names of the categories that were flagged, sorted.
    pub fn flagged_categories(&self) -> Vec<&str> {
        let mut flagged: Vec<&str> = self
            .categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
            .collect();
        flagged.sort_unstable();
        flagged
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub id: String,
    pub model: String,
    pub results: Vec<ModerationResult>,
}

impl ChatGpt {
    /// Classifies whether the input violates OpenAI's usage policies.
    pub async fn create_moderation(
        &self,
        request: &ModerationRequest,
    ) -> Result<ModerationResponse, ConnectorError> {
        request.validate()?;
        self.client.post("moderations", request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::mock::MockTransport;

    #[tokio::test]
    async fn create_moderation_reports_flagged_categories() {
        let transport = MockTransport::with_json(
            200,
            json!({
                "id": "modr-1",
                "model": "omni-moderation-latest",
                "results": [{
                    "flagged": true,
                    "categories": {"violence": true, "harassment": false, "hate": true},
                    "category_scores": {"violence": 0.91, "harassment": 0.01, "hate": 0.7}
                }]
            }),
        );
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let response = chatgpt
            .create_moderation(&ModerationRequest::new("some text"))
            .await
            .expect("moderation");
        assert!(response.results[0].flagged);
        assert_eq!(response.results[0].flagged_categories(), vec!["hate", "violence"]);
        assert!(transport.last_request().url.ends_with("/moderations"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(ModerationRequest::new("").validate().is_err());
        assert!(ModerationRequest::new(Vec::<String>::new()).validate().is_err());
    }
}
