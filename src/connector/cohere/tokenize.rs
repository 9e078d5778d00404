use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ConnectorError;
use crate::validate::{require_max_len, require_non_empty, require_non_empty_list};

use super::Cohere;

const MAX_TEXT_CHARS: usize = 65536;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeResponse {
    pub tokens: Vec<i64>,
    #[serde(default)]
    pub token_strings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetokenizeResponse {
    pub text: String,
}

impl Cohere {
    /// Splits `text` into the token ids used by `model`.
    pub async fn tokenize(&self, text: &str, model: &str) -> Result<TokenizeResponse, ConnectorError> {
        if text.is_empty() {
            return Err(ConnectorError::validation("`text` must not be empty"));
        }
        require_max_len("text", text, MAX_TEXT_CHARS)?;
        require_non_empty("model", model)?;
        self.client
            .post("v1/tokenize", &json!({"text": text, "model": model}))
            .await
    }

    /// Turns token ids back into text.
    pub async fn detokenize(
        &self,
        tokens: &[i64],
        model: &str,
    ) -> Result<DetokenizeResponse, ConnectorError> {
        require_non_empty_list("tokens", tokens)?;
        require_non_empty("model", model)?;
        self.client
            .post("v1/detokenize", &json!({"tokens": tokens, "model": model}))
            .await
    }
}
