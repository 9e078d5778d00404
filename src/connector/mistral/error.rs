use std::time::Duration;

use crate::error::{ConnectorError, parse_error_body};

/// Mistral returns `{"object":"error","message":..,"type":..}` for most failures and
/// FastAPI-style `{"detail": [{"msg": ..}]}` for schema violations (422).
pub(crate) fn parse_mistral_error(
    provider: &'static str,
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> ConnectorError {
    parse_error_body(provider, status, body, retry_after)
}
