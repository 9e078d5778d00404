use std::time::Duration;

use crate::error::{ConnectorError, ErrorDetail, classify_status, extract_error_detail};

/// Parses error responses returned by the OpenAI API (also used by the DALL-E connector).
pub(crate) fn parse_openai_error(
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
        Some("model_not_found") => ConnectorError::NotFound { provider, message },
        Some("invalid_api_key") => ConnectorError::Auth { provider, message },
        // Exhausted quota is reported as 429 but waiting does not help.
        Some("insufficient_quota") => ConnectorError::Api {
            provider,
            status,
            message,
        },
        _ => classify_status(provider, status, message, retry_after),
    }
}
