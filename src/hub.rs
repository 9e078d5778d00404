use std::collections::HashMap;

use tracing::debug;

use crate::connector::DynConnector;
use crate::error::ConnectorError;
use crate::types::{Capabilities, ChatRequest, ChatResponse, ModelSummary};

/// Registry of connectors keyed by caller-chosen handles such as `openai-default`.
#[derive(Default)]
pub struct ConnectorHub {
    connectors: HashMap<String, DynConnector>,
}

impl ConnectorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `connector` under `handle`, replacing any previous registration.
    pub fn register<S: Into<String>>(mut self, handle: S, connector: DynConnector) -> Self {
        self.connectors.insert(handle.into(), connector);
        self
    }

    /// Sends a chat request through the connector registered under `handle`.
    pub async fn chat(&self, handle: &str, request: ChatRequest) -> Result<ChatResponse, ConnectorError> {
        let connector = self.get(handle)?;
        debug!(handle, provider = connector.name(), "dispatching chat");
        connector.chat(request).await
    }

    pub async fn list_models(&self, handle: &str) -> Result<Vec<ModelSummary>, ConnectorError> {
        self.get(handle)?.list_models().await
    }

    pub fn capabilities(&self, handle: &str) -> Result<Capabilities, ConnectorError> {
        Ok(self.get(handle)?.capabilities())
    }

    /// Registered handles, sorted.
    pub fn handles(&self) -> Vec<String> {
        let mut handles: Vec<String> = self.connectors.keys().cloned().collect();
        handles.sort();
        handles
    }

    /// Handles whose connector offers chat, sorted.
    pub fn handles_supporting_chat(&self) -> Vec<String> {
        let mut handles: Vec<String> = self
            .connectors
            .iter()
            .filter(|(_, connector)| connector.capabilities().chat)
            .map(|(handle, _)| handle.clone())
            .collect();
        handles.sort();
        handles
    }

    pub fn get(&self, handle: &str) -> Result<DynConnector, ConnectorError> {
        self.connectors
            .get(handle)
            .cloned()
            .ok_or_else(|| ConnectorError::validation(format!("unknown connector handle: {handle}")))
    }
}

impl std::fmt::Debug for ConnectorHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorHub")
            .field("handles", &self.handles())
            .finish()
    }
}
