use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connector::{
    ChatGpt, Claude, Cohere, Dalle, DynConnector, Mistral, Stability, TensorFlow,
};
use crate::error::ConnectorError;
use crate::http::DynHttpTransport;
use crate::hub::ConnectorHub;

/// Describes one connector instance, loadable from JSON.
///
/// # Examples
///
/// ```
/// use ai_connectors::config::{ConnectorConfig, Credential, ProviderKind};
///
/// let config: ConnectorConfig = serde_json::from_str(
///     r#"{
///         "handle": "local-serving",
///         "provider": "tensorflow",
///         "credential": {"type": "none"},
///         "base_url": "http://127.0.0.1:8501/v1"
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(config.provider, ProviderKind::TensorFlow);
/// assert_eq!(config.credential, Credential::None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Caller-chosen handle, e.g. `default-openai`.
    pub handle: String,
    pub provider: ProviderKind,
    pub credential: Credential,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// OpenAI organization id, used by ChatGPT and DALL-E.
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub default_model: Option<String>,
    /// Vendor-specific settings: `project`, `version`, `beta`, `client_name`,
    /// `client_id`, `client_version`.
    #[serde(default)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Claude,
    Cohere,
    Dalle,
    Mistral,
    Stability,
    #[serde(rename = "tensorflow")]
    TensorFlow,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 7] = [
        ProviderKind::ChatGpt,
        ProviderKind::Claude,
        ProviderKind::Cohere,
        ProviderKind::Dalle,
        ProviderKind::Mistral,
        ProviderKind::Stability,
        ProviderKind::TensorFlow,
    ];

    /// Environment variable conventionally holding the credential.
    pub fn api_key_env(self) -> &'static str {
        match self {
            ProviderKind::ChatGpt | ProviderKind::Dalle => "OPENAI_API_KEY",
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
            ProviderKind::Cohere => "COHERE_API_KEY",
            ProviderKind::Mistral => "MISTRAL_API_KEY",
            ProviderKind::Stability => "STABILITY_API_KEY",
            ProviderKind::TensorFlow => "TENSORFLOW_SERVING_TOKEN",
        }
    }

    fn requires_credential(self) -> bool {
        self != ProviderKind::TensorFlow
    }

    fn as_str(self) -> &'static str {
        match self {
            ProviderKind::ChatGpt => "chatgpt",
            ProviderKind::Claude => "claude",
            ProviderKind::Cohere => "cohere",
            ProviderKind::Dalle => "dalle",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Stability => "stability",
            ProviderKind::TensorFlow => "tensorflow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    ApiKey { key: String },
    Bearer { token: String },
    /// For unauthenticated local deployments.
    None,
}

impl Credential {
    fn secret(&self) -> Option<&str> {
        match self {
            Credential::ApiKey { key } => Some(key.as_str()),
            Credential::Bearer { token } => Some(token.as_str()),
            Credential::None => None,
        }
        .filter(|secret| !secret.trim().is_empty())
    }
}

impl ConnectorConfig {
    pub fn new(handle: impl Into<String>, provider: ProviderKind, credential: Credential) -> Self {
        Self {
            handle: handle.into(),
            provider,
            credential,
            base_url: None,
            timeout_secs: None,
            organization: None,
            default_model: None,
            extra: HashMap::new(),
        }
    }

    /// Reads the credential from [`ProviderKind::api_key_env`].
    ///
    /// A missing variable is an `Auth` error, except for TensorFlow Serving where it
    /// yields [`Credential::None`].
    pub fn from_env(handle: impl Into<String>, provider: ProviderKind) -> Result<Self, ConnectorError> {
        let credential = match std::env::var(provider.api_key_env()) {
            Ok(key) if !key.trim().is_empty() => match provider {
                ProviderKind::TensorFlow => Credential::Bearer { token: key },
                _ => Credential::ApiKey { key },
            },
            _ if !provider.requires_credential() => Credential::None,
            _ => {
                return Err(ConnectorError::Auth {
                    provider: provider.as_str(),
                    message: format!("{} is not set", provider.api_key_env()),
                });
            }
        };
        Ok(Self::new(handle, provider, credential))
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn extra_str(&self, key: &str) -> Option<String> {
        match self.extra.get(key) {
            Some(Value::String(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Builds a hub holding one connector per config, keyed by handle.
pub fn build_hub_from_configs(
    configs: &[ConnectorConfig],
    transport: DynHttpTransport,
) -> Result<ConnectorHub, ConnectorError> {
    let mut hub = ConnectorHub::new();
    for config in configs {
        let connector = build_connector(config, transport.clone())?;
        hub = hub.register(config.handle.clone(), connector);
    }
    Ok(hub)
}

/// Builds the connector described by `config`.
pub fn build_connector(
    config: &ConnectorConfig,
    transport: DynHttpTransport,
) -> Result<DynConnector, ConnectorError> {
    if config.timeout_secs == Some(0) {
        return Err(ConnectorError::InvalidConfig {
            field: "timeout_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let connector: DynConnector = match config.provider {
        ProviderKind::ChatGpt => {
            let mut connector = ChatGpt::new(transport, require_secret(config)?);
            if let Some(base_url) = &config.base_url {
                connector = connector.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout() {
                connector = connector.with_timeout(timeout);
            }
            if let Some(organization) = &config.organization {
                connector = connector.with_organization(organization.clone());
            }
            if let Some(project) = config.extra_str("project") {
                connector = connector.with_project(project);
            }
            if let Some(model) = &config.default_model {
                connector = connector.with_default_model(model.clone());
            }
            Arc::new(connector)
        }
        ProviderKind::Claude => {
            let mut connector = Claude::new(transport, require_secret(config)?);
            if let Some(base_url) = &config.base_url {
                connector = connector.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout() {
                connector = connector.with_timeout(timeout);
            }
            if let Some(version) = config.extra_str("version") {
                connector = connector.with_version(version);
            }
            if let Some(beta) = config.extra_str("beta") {
                connector = connector.with_beta(beta);
            }
            if let Some(model) = &config.default_model {
                connector = connector.with_default_model(model.clone());
            }
            Arc::new(connector)
        }
        ProviderKind::Cohere => {
            let mut connector = Cohere::new(transport, require_secret(config)?);
            if let Some(base_url) = &config.base_url {
                connector = connector.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout() {
                connector = connector.with_timeout(timeout);
            }
            if let Some(client_name) = config.extra_str("client_name") {
                connector = connector.with_client_name(client_name);
            }
            if let Some(model) = &config.default_model {
                connector = connector.with_default_model(model.clone());
            }
            Arc::new(connector)
        }
        ProviderKind::Dalle => Arc::new(build_dalle(config, transport)?),
        ProviderKind::Mistral => {
            let mut connector = Mistral::new(transport, require_secret(config)?);
            if let Some(base_url) = &config.base_url {
                connector = connector.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout() {
                connector = connector.with_timeout(timeout);
            }
            if let Some(model) = &config.default_model {
                connector = connector.with_default_model(model.clone());
            }
            Arc::new(connector)
        }
        ProviderKind::Stability => {
            let mut connector = Stability::new(transport, require_secret(config)?);
            if let Some(base_url) = &config.base_url {
                connector = connector.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout() {
                connector = connector.with_timeout(timeout);
            }
            if let Some(client_id) = config.extra_str("client_id") {
                connector = connector.with_client_id(client_id);
            }
            if let Some(version) = config.extra_str("client_version") {
                connector = connector.with_client_version(version);
            }
            Arc::new(connector)
        }
        ProviderKind::TensorFlow => {
            let mut connector = TensorFlow::new(transport);
            if let Some(base_url) = &config.base_url {
                connector = connector.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout() {
                connector = connector.with_timeout(timeout);
            }
            if let Some(token) = config.credential.secret() {
                connector = connector.with_bearer_token(token);
            }
            Arc::new(connector)
        }
    };

    Ok(connector)
}

fn build_dalle(config: &ConnectorConfig, transport: DynHttpTransport) -> Result<Dalle, ConnectorError> {
    let mut connector = Dalle::new(transport, require_secret(config)?);
    if let Some(base_url) = &config.base_url {
        connector = connector.with_base_url(base_url.clone());
    }
    if let Some(timeout) = config.timeout() {
        connector = connector.with_timeout(timeout);
    }
    if let Some(organization) = &config.organization {
        connector = connector.with_organization(organization.clone());
    }
    if let Some(project) = config.extra_str("project") {
        connector = connector.with_project(project);
    }
    Ok(connector)
}

fn require_secret(config: &ConnectorConfig) -> Result<String, ConnectorError> {
    config
        .credential
        .secret()
        .map(str::to_string)
        .ok_or_else(|| ConnectorError::Auth {
            provider: config.provider.as_str(),
            message: format!("handle {} requires a non-empty credential", config.handle),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connector::dalle::images::ImageGenerationRequest;
    use crate::http::mock::MockTransport;

    fn key(value: &str) -> Credential {
        Credential::ApiKey {
            key: value.to_string(),
        }
    }

    #[test]
    fn builds_every_provider() {
        let configs: Vec<ConnectorConfig> = ProviderKind::ALL
            .iter()
            .map(|kind| ConnectorConfig::new(kind.as_str(), *kind, key("test-key")))
            .collect();

        let hub = build_hub_from_configs(&configs, MockTransport::new()).expect("hub");
        assert_eq!(
            hub.handles(),
            vec!["chatgpt", "claude", "cohere", "dalle", "mistral", "stability", "tensorflow"]
        );
        for kind in ProviderKind::ALL {
            let connector = hub.get(kind.as_str()).expect("connector");
            assert_eq!(connector.name(), kind.as_str());
        }
    }

    #[test]
    fn empty_credential_is_rejected_except_for_tensorflow() {
        let transport = MockTransport::new();
        for credential in [Credential::None, key("  ")] {
            let config = ConnectorConfig::new("openai", ProviderKind::ChatGpt, credential);
            match build_connector(&config, transport.clone()) {
                Err(ConnectorError::Auth { provider, message }) => {
                    assert_eq!(provider, "chatgpt");
                    assert!(message.contains("openai"), "unexpected message: {message}");
                }
                Err(other) => panic!("unexpected error type: {other:?}"),
                Ok(_) => panic!("expected auth error"),
            }
        }

        let config = ConnectorConfig::new("local", ProviderKind::TensorFlow, Credential::None);
        assert!(build_connector(&config, transport).is_ok());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut config = ConnectorConfig::new("c", ProviderKind::Cohere, key("k"));
        config.timeout_secs = Some(0);
        let Err(err) = build_connector(&config, MockTransport::new()) else {
            panic!("expected InvalidConfig");
        };
        assert!(matches!(err, ConnectorError::InvalidConfig { ref field, .. } if field == "timeout_secs"));
    }

    #[tokio::test]
    async fn settings_reach_the_wire() {
        let transport = MockTransport::with_json(200, json!({"object": "list", "data": []}));
        let config: ConnectorConfig = serde_json::from_value(json!({
            "handle": "proxy-openai",
            "provider": "chatgpt",
            "credential": {"type": "bearer", "token": "sk-proxy"},
            "base_url": "https://proxy.internal/openai/v1",
            "timeout_secs": 30,
            "organization": "org-1",
            "extra": {"project": "proj-9"}
        }))
        .expect("config");

        let connector = build_connector(&config, transport.clone()).expect("connector");
        connector.list_models().await.expect("models");

        let sent = transport.last_request();
        assert_eq!(sent.url, "https://proxy.internal/openai/v1/models");
        assert_eq!(sent.header("authorization"), Some("Bearer sk-proxy"));
        assert_eq!(sent.header("openai-organization"), Some("org-1"));
        assert_eq!(sent.header("openai-project"), Some("proj-9"));
        assert_eq!(sent.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn dalle_shares_openai_account_headers() {
        let transport = MockTransport::with_json(200, json!({"created": 1, "data": []}));
        let config: ConnectorConfig = serde_json::from_value(json!({
            "handle": "images",
            "provider": "dalle",
            "credential": {"type": "api_key", "key": "sk-img"},
            "organization": "org-1",
            "extra": {"project": "proj-9"}
        }))
        .expect("config");

        let dalle = build_dalle(&config, transport.clone()).expect("connector");
        dalle
            .create_image(&ImageGenerationRequest::new("a kite"))
            .await
            .expect("images");

        let sent = transport.last_request();
        assert_eq!(sent.header("openai-organization"), Some("org-1"));
        assert_eq!(sent.header("openai-project"), Some("proj-9"));
        assert_eq!(sent.header("authorization"), Some("Bearer sk-img"));
    }

    #[tokio::test]
    async fn tensorflow_forwards_optional_bearer_token() {
        let transport = MockTransport::with_json(200, json!({"data": []}));
        let mut config = ConnectorConfig::new(
            "gateway",
            ProviderKind::TensorFlow,
            Credential::Bearer {
                token: "gw".to_string(),
            },
        );
        config.base_url = Some("http://serving:8501/v1".to_string());
        let connector = build_connector(&config, transport.clone()).expect("connector");
        assert!(connector.capabilities().inference);
        assert_eq!(connector.name(), "tensorflow");
        assert_eq!(Credential::None.secret(), None);
        assert_eq!(config.credential.secret(), Some("gw"));
    }

    #[test]
    fn from_env_reads_provider_variables() {
        // Both variables are only touched by this test.
        unsafe {
            std::env::remove_var("STABILITY_API_KEY");
            std::env::remove_var("TENSORFLOW_SERVING_TOKEN");
        }
        match ConnectorConfig::from_env("stab", ProviderKind::Stability) {
            Err(ConnectorError::Auth { provider, message }) => {
                assert_eq!(provider, "stability");
                assert!(message.contains("STABILITY_API_KEY"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
        let config = ConnectorConfig::from_env("local", ProviderKind::TensorFlow).expect("config");
        assert_eq!(config.credential, Credential::None);

        unsafe {
            std::env::set_var("STABILITY_API_KEY", "   ");
            std::env::set_var("TENSORFLOW_SERVING_TOKEN", "gw-token");
        }
        assert!(matches!(
            ConnectorConfig::from_env("stab", ProviderKind::Stability),
            Err(ConnectorError::Auth { .. })
        ));
        let config = ConnectorConfig::from_env("gateway", ProviderKind::TensorFlow).expect("config");
        assert_eq!(
            config.credential,
            Credential::Bearer {
                token: "gw-token".to_string()
            }
        );

        unsafe {
            std::env::set_var("STABILITY_API_KEY", "sk-stab");
        }
        let config = ConnectorConfig::from_env("stab", ProviderKind::Stability).expect("config");
        assert_eq!(config.handle, "stab");
        assert_eq!(config.credential, key("sk-stab"));

        unsafe {
            std::env::remove_var("STABILITY_API_KEY");
            std::env::remove_var("TENSORFLOW_SERVING_TOKEN");
        }
    }

    #[test]
    fn env_names() {
        assert_eq!(ProviderKind::Dalle.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(ProviderKind::Claude.api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(ProviderKind::TensorFlow.api_key_env(), "TENSORFLOW_SERVING_TOKEN");
    }
}
