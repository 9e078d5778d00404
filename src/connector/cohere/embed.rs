use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConnectorError;
use crate::validate::{
    require_at_least, require_exactly_one, require_max_items, require_non_empty,
    require_non_empty_list, require_one_of, require_one_of_opt,
};

use super::Cohere;

const MAX_BATCH: usize = 96;
const INPUT_TYPES: [&str; 5] = [
    "search_document",
    "search_query",
    "classification",
    "clustering",
    "image",
];
const EMBEDDING_TYPES: [&str; 5] = ["float", "int8", "uint8", "binary", "ubinary"];
const TRUNCATE: [&str; 3] = ["NONE", "START", "END"];

/// Body of `POST /v2/embed`. Exactly one of `texts` or `images` (data URIs) is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    pub input_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate: Option<String>,
}

impl EmbedRequest {
    pub fn texts(model: impl Into<String>, texts: Vec<String>, input_type: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            texts: Some(texts),
            input_type: input_type.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        require_exactly_one("texts", self.texts.is_some(), "images", self.images.is_some())?;
        if let Some(texts) = &self.texts {
            require_non_empty_list("texts", texts)?;
            require_max_items("texts", texts, MAX_BATCH)?;
        }
        if let Some(images) = &self.images {
            require_non_empty_list("images", images)?;
            require_max_items("images", images, 1)?;
        }
        require_one_of("input_type", &self.input_type, &INPUT_TYPES)?;
        for kind in self.embedding_types.iter().flatten() {
            require_one_of("embedding_types[]", kind, &EMBEDDING_TYPES)?;
        }
        require_one_of_opt("truncate", self.truncate.as_deref(), &TRUNCATE)
    }
}

/// Embeddings keyed by the requested numeric type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingsByType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float: Option<Vec<Vec<f32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int8: Option<Vec<Vec<i8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uint8: Option<Vec<Vec<u8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<Vec<Vec<i8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubinary: Option<Vec<Vec<u8>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub id: String,
    pub embeddings: EmbeddingsByType,
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    #[serde(default)]
    pub meta: Option<Value>,
}

/// Body of `POST /v2/rerank`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RerankRequest {
    pub model: String,
    pub query: String,
    pub documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens_per_doc: Option<u32>,
}

impl RerankRequest {
    pub fn new(model: impl Into<String>, query: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            model: model.into(),
            query: query.into(),
            documents,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        require_non_empty("query", &self.query)?;
        require_non_empty_list("documents", &self.documents)?;
        if let Some(top_n) = self.top_n {
            require_at_least("top_n", top_n, 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    pub index: usize,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub results: Vec<RerankResult>,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyExample {
    pub text: String,
    pub label: String,
}

/// Body of `POST /v1/classify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ClassifyExample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate: Option<String>,
}

impl ClassifyRequest {
    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty_list("inputs", &self.inputs)?;
        require_max_items("inputs", &self.inputs, MAX_BATCH)?;
        for example in &self.examples {
            require_non_empty("examples[].text", &example.text)?;
            require_non_empty("examples[].label", &example.label)?;
        }
        require_one_of_opt("truncate", self.truncate.as_deref(), &TRUNCATE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelConfidence {
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub labels: HashMap<String, LabelConfidence>,
    #[serde(default)]
    pub classification_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub classifications: Vec<Classification>,
}

impl Cohere {
    /// Embeds texts or a single image.
    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, ConnectorError> {
        request.validate()?;
        self.client.post("v2/embed", request).await
    }

    /// Orders `documents` by relevance to `query`.
    pub async fn rerank(&self, request: &RerankRequest) -> Result<RerankResponse, ConnectorError> {
        request.validate()?;
        self.client.post("v2/rerank", request).await
    }

    /// Labels each input using few-shot examples or a fine-tuned classifier.
    pub async fn classify(
        &self,
        request: &ClassifyRequest,
    ) -> Result<ClassifyResponse, ConnectorError> {
        request.validate()?;
        self.client.post("v1/classify", request).await
    }
}
