use std::time::Duration;

use crate::error::{ConnectorError, parse_error_body};

/// TensorFlow Serving answers `{"error": ".."}`. Some builds report a missing servable
/// with status 400, so the message is checked as well.
pub(crate) fn parse_serving_error(
    provider: &'static str,
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> ConnectorError {
    match parse_error_body(provider, status, body, retry_after) {
        ConnectorError::Api { message, .. } if message.contains("Servable not found") => {
            ConnectorError::NotFound { provider, message }
        }
        err => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servable_not_found_maps_to_not_found() {
        let body = r#"{ "error": "Servable not found for request: Latest(resnet)" }"#;
        assert!(matches!(
            parse_serving_error("tensorflow", 400, body, None),
            ConnectorError::NotFound { provider: "tensorflow", .. }
        ));
        assert!(matches!(
            parse_serving_error("tensorflow", 404, body, None),
            ConnectorError::NotFound { .. }
        ));
    }

    #[test]
    fn other_errors_keep_status() {
        let body = r#"{"error": "Failed to process element: 0 of 'instances' list. Error: Invalid argument"}"#;
        match parse_serving_error("tensorflow", 400, body, None) {
            ConnectorError::Api { status, message, .. } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("Failed to process element"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
