//! Uniform async connectors for hosted AI APIs: ChatGPT, Claude, Cohere, DALL-E,
//! Mistral, Stability and TensorFlow Serving.
//!
//! Every connector validates its arguments before issuing exactly one HTTP call through
//! [`http::ApiClient`], and every failure is reported as a [`ConnectorError`] tagged
//! with the provider name.

pub mod config;
pub mod connector;
pub mod error;
pub mod http;
pub mod hub;
pub mod types;
pub mod validate;

pub use config::{ConnectorConfig, Credential, ProviderKind, build_connector, build_hub_from_configs};
pub use connector::{
    ChatGpt, Claude, Cohere, Connector, Dalle, DynConnector, Mistral, Stability, TensorFlow,
};
pub use error::ConnectorError;
pub use http::{ApiClient, DynHttpTransport, HttpTransport, MultipartForm};
pub use hub::ConnectorHub;
pub use types::*;
