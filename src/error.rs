use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::TransportError;

/// Aggregates every failure mode exposed by the connectors.
///
/// Every variant raised after a request left the process carries the provider name, so
/// callers can report which vendor failed without keeping extra context around.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Arguments were rejected before any HTTP call was made.
    #[error("invalid request: {message}")]
    Validation { message: String },
    /// Raised when building or validating configuration fails.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the configuration field that failed validation.
        field: String,
        /// Additional context explaining why the field is invalid.
        reason: String,
    },
    /// Reports invalid or missing credentials.
    #[error("{provider} auth failure: {message}")]
    Auth {
        provider: &'static str,
        message: String,
    },
    /// Indicates that the provider throttled the request.
    #[error("{provider} rate limited: {message}")]
    RateLimit {
        provider: &'static str,
        /// Raw message returned by the upstream provider.
        message: String,
        /// Optional wait duration suggested by the provider before retrying.
        retry_after: Option<Duration>,
    },
    /// The addressed model, file, job or engine does not exist.
    #[error("{provider} resource not found: {message}")]
    NotFound {
        provider: &'static str,
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("{provider} request timed out: {message}")]
    Timeout {
        provider: &'static str,
        message: String,
    },
    /// Represents transport-layer or networking failures.
    #[error("{provider} transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },
    /// Any other non-success status returned by the provider.
    #[error("{provider} error (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("{provider} returned an unexpected payload: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
    /// Declares that a capability is not offered by the selected connector.
    #[error("{provider} does not support {feature}")]
    Unsupported {
        provider: &'static str,
        feature: &'static str,
    },
}

impl ConnectorError {
    /// Creates a [`ConnectorError::Validation`] from a textual description.
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_connectors::error::ConnectorError;
    ///
    /// let err = ConnectorError::validation("`prompt` must not be empty");
    /// assert!(matches!(err, ConnectorError::Validation { .. }));
    /// assert!(err.provider().is_none());
    /// ```
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a [`ConnectorError::Transport`] tagged with the provider name.
    pub fn transport<T: Into<String>>(provider: &'static str, message: T) -> Self {
        Self::Transport {
            provider,
            message: message.into(),
        }
    }

    /// Creates a [`ConnectorError::Api`] for an unmapped status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_connectors::error::ConnectorError;
    ///
    /// let err = ConnectorError::api("cohere", 500, "internal error");
    /// assert_eq!(err.provider(), Some("cohere"));
    /// assert_eq!(err.to_string(), "cohere error (status 500): internal error");
    /// ```
    pub fn api<T: Into<String>>(provider: &'static str, status: u16, message: T) -> Self {
        Self::Api {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Creates a [`ConnectorError::Decode`] for a payload that could not be shaped.
    pub fn decode<T: Into<String>>(provider: &'static str, message: T) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    /// Tags a transport failure with the provider that issued the request.
    pub fn from_transport(provider: &'static str, err: TransportError) -> Self {
        match err {
            TransportError::Timeout(message) => Self::Timeout { provider, message },
            other => Self::Transport {
                provider,
                message: other.to_string(),
            },
        }
    }

    /// Returns the provider name for errors raised after a request was attempted.
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            Self::Validation { .. } | Self::InvalidConfig { .. } => None,
            Self::Auth { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::NotFound { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Api { provider, .. }
            | Self::Decode { provider, .. }
            | Self::Unsupported { provider, .. } => Some(provider),
        }
    }

    /// HTTP status associated with the error category.
    ///
    /// Exact for `Api`. `RateLimit` and `NotFound` report the canonical 429 and 404 even
    /// when a vendor signalled them through an error code on another status, e.g. a 400
    /// carrying `model_not_found`. `Auth` yields `None` because it is also raised by local
    /// credential checks before any request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimit { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Message and optional machine-readable code pulled out of a vendor error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ErrorDetail {
    pub(crate) message: String,
    pub(crate) code: Option<String>,
}

/// Extracts the human-readable message from the error envelopes used by the vendors.
///
/// Recognized shapes: `{"error": {"message", "type", "code"}}`, `{"error": "..."}`,
/// `{"message": "..."}`, `{"detail": "..." | [{"msg": ..}]}` and
/// `{"errors": ["..."], "name": ".."}`.
pub(crate) fn extract_error_detail(body: &str) -> Option<ErrorDetail> {
    #[derive(Deserialize)]
    struct Envelope {
        error: Option<Value>,
        message: Option<Value>,
        detail: Option<Value>,
        errors: Option<Vec<Value>>,
        name: Option<String>,
        code: Option<Value>,
    }

    let parsed: Envelope = serde_json::from_str(body).ok()?;
    let top_code = parsed.code.as_ref().and_then(value_to_code);

    if let Some(error) = parsed.error {
        match error {
            Value::String(message) => {
                return Some(ErrorDetail {
                    message,
                    code: top_code,
                });
            }
            Value::Object(map) => {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                let code = map
                    .get("code")
                    .and_then(value_to_code)
                    .or_else(|| map.get("type").and_then(value_to_code));
                return Some(ErrorDetail { message, code });
            }
            _ => {}
        }
    }

    if let Some(Value::String(message)) = parsed.message {
        return Some(ErrorDetail {
            message,
            code: top_code.or(parsed.name),
        });
    }

    if let Some(detail) = parsed.detail {
        let message = match detail {
            Value::String(text) => text,
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        };
        return Some(ErrorDetail {
            message,
            code: top_code,
        });
    }

    if let Some(errors) = parsed.errors {
        let message = errors
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Some(ErrorDetail {
            message,
            code: parsed.name.or(top_code),
        });
    }

    None
}

fn value_to_code(value: &Value) -> Option<String> {
    match value {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

/// Maps a non-success response onto the normalized error variants.
///
/// Vendor-specific `error.rs` modules call this after handling their own special cases.
pub(crate) fn parse_error_body(
    provider: &'static str,
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> ConnectorError {
    let message = match extract_error_detail(body) {
        Some(ErrorDetail {
            message,
            code: Some(code),
        }) => format!("{message} ({code})"),
        Some(ErrorDetail {
            message,
            code: None,
        }) => message,
        // Fallback: if the payload cannot be parsed, surface the raw body.
        None => format!("status {status}: {}", body.trim()),
    };
    classify_status(provider, status, message, retry_after)
}

pub(crate) fn classify_status(
    provider: &'static str,
    status: u16,
    message: String,
    retry_after: Option<Duration>,
) -> ConnectorError {
    match status {
        401 | 403 => ConnectorError::Auth { provider, message },
        404 => ConnectorError::NotFound { provider, message },
        408 | 504 => ConnectorError::Timeout { provider, message },
        429 => ConnectorError::RateLimit {
            provider,
            message,
            retry_after,
        },
        _ => ConnectorError::Api {
            provider,
            status,
            message,
        },
    }
}

/// Extracts the `Retry-After` header (in seconds) if present.
///
/// HTTP-date values are ignored because vendors primarily use the numeric form.
pub(crate) fn retry_after_from_headers(headers: &HashMap<String, String>) -> Option<Duration> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
        .and_then(|(_, value)| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
