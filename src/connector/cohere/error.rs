use std::time::Duration;

use crate::error::{ConnectorError, parse_error_body};

/// Cohere reports failures as `{"message": ".."}`. Status 498 is its "invalid token"
/// code and 499 a request cancelled upstream.
pub(crate) fn parse_cohere_error(
    provider: &'static str,
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> ConnectorError {
    match (status, parse_error_body(provider, status, body, retry_after)) {
        (498, ConnectorError::Api { message, .. }) => ConnectorError::Auth { provider, message },
        (499, ConnectorError::Api { message, .. }) => ConnectorError::Transport { provider, message },
        (_, err) => err,
    }
}
