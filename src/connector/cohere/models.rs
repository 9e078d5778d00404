use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::Query;
use crate::validate::{require_one_of_opt, require_range_opt};

use super::Cohere;

const ENDPOINTS: [&str; 7] = ["chat", "embed", "classify", "summarize", "rerank", "rate", "generate"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereModel {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub finetuned: Option<bool>,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default)]
    pub default_endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelListPage {
    pub models: Vec<CohereModel>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Cohere {
    /// Lists models, optionally only those compatible with `endpoint`.
    pub async fn list_models(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<ModelListPage, ConnectorError> {
        require_range_opt("page_size", page_size, 1, 1000)?;
        require_one_of_opt("endpoint", endpoint, &ENDPOINTS)?;
        let query = Query::new()
            .push_opt("page_size", page_size)
            .push_opt("page_token", page_token)
            .push_opt("endpoint", endpoint);
        self.client.get("v1/models", &query).await
    }
}
