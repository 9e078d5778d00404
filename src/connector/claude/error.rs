use std::time::Duration;

use crate::error::{ConnectorError, ErrorDetail, classify_status, extract_error_detail};

/// Parses Anthropic error envelopes (`{"type":"error","error":{"type","message"}}`).
///
/// The `error.type` string is more precise than the status code, so it wins when known.
pub(crate) fn parse_anthropic_error(
    provider: &'static str,
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> ConnectorError {
    let Some(ErrorDetail { message, code }) = extract_error_detail(body) else {
        return classify_status(
            provider,
            status,
            format!("status {status}: {}", body.trim()),
            retry_after,
        );
    };

    let message = match &code {
        Some(code) => format!("{message} ({code})"),
        None => message,
    };

    match code.as_deref() {
        Some("authentication_error" | "permission_error") => {
            ConnectorError::Auth { provider, message }
        }
        Some("not_found_error") => ConnectorError::NotFound { provider, message },
        Some("rate_limit_error") => ConnectorError::RateLimit {
            provider,
            message,
            retry_after,
        },
        Some("timeout_error") => ConnectorError::Timeout { provider, message },
        _ => classify_status(provider, status, message, retry_after),
    }
}
