//! Stability AI connector: v1 generation and account endpoints plus the v2beta
//! Stable Image Core endpoint.

use std::time::Duration;

use async_trait::async_trait;

use crate::connector::Connector;
use crate::error::ConnectorError;
use crate::http::{ApiClient, DynHttpTransport};
use crate::types::{Capabilities, ModelSummary};

pub mod account;
mod error;
pub mod generation;
pub mod stable_image;

pub(crate) use error::parse_stability_error;

const NAME: &str = "stability";
const DEFAULT_BASE_URL: &str = "https://api.stability.ai";

pub(crate) const STYLE_PRESETS: [&str; 17] = [
    "3d-model",
    "analog-film",
    "anime",
    "cinematic",
    "comic-book",
    "digital-art",
    "enhance",
    "fantasy-art",
    "isometric",
    "line-art",
    "low-poly",
    "modeling-compound",
    "neon-punk",
    "origami",
    "photographic",
    "pixel-art",
    "tile-texture",
];

#[derive(Debug, Clone)]
pub struct Stability {
    pub(crate) client: ApiClient,
}

impl Stability {
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let client = ApiClient::new(NAME, transport, DEFAULT_BASE_URL, parse_stability_error)
            .with_header("Authorization", format!("Bearer {}", api_key.into()));
        Self { client }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    /// Sets `Stability-Client-ID`, used by Stability to attribute traffic.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client = self.client.with_header("Stability-Client-ID", client_id);
        self
    }

    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client = self.client.with_header("Stability-Client-Version", version);
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
impl Connector for Stability {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            images: true,
            models: true,
            ..Capabilities::default()
        }
    }

    /// Engines are the closest Stability equivalent of models.
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ConnectorError> {
        let engines = self.list_engines().await?;
        Ok(engines
            .into_iter()
            .map(|engine| ModelSummary {
                id: engine.id,
                owned_by: Some(NAME.to_string()),
            })
            .collect())
    }
}
