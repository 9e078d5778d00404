use std::time::Duration;

use crate::error::{ConnectorError, ErrorDetail, classify_status, extract_error_detail};

/// Parses `{"id","name","message"}` (v1) and `{"id","name","errors":[..]}` (v2beta).
///
/// A 403 tagged `content_moderation` is a rejected prompt, not a credential problem.
pub(crate) fn parse_stability_error(
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

    if code.as_deref() == Some("content_moderation") {
        return ConnectorError::Api {
            provider,
            status,
            message,
        };
    }
    classify_status(provider, status, message, retry_after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_and_v2beta_envelopes() {
        let body = r#"{"id":"a1","name":"unauthorized","message":"missing authorization header"}"#;
        match parse_stability_error("stability", 401, body, None) {
            ConnectorError::Auth { message, .. } => {
                assert_eq!(message, "missing authorization header (unauthorized)");
            }
            other => panic!("expected Auth error, got {other:?}"),
        }

        let body = r#"{"id":"b2","name":"bad_request","errors":["prompt: is required","aspect_ratio: invalid"]}"#;
        match parse_stability_error("stability", 400, body, None) {
            ConnectorError::Api { status, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "prompt: is required; aspect_ratio: invalid (bad_request)");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn content_moderation_is_not_auth() {
        let body = r#"{"id":"c3","name":"content_moderation","errors":["Your request was flagged"]}"#;
        assert!(matches!(
            parse_stability_error("stability", 403, body, None),
            ConnectorError::Api { status: 403, .. }
        ));
    }
}
