use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::Query;
use crate::validate::{require_at_most_one, require_path_segment, require_range_opt};

use super::Claude;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Cursor-paginated model listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPage {
    pub data: Vec<ModelInfo>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
}

impl Claude {
    /// Lists models, most recent first. `before_id` and `after_id` are cursors and
    /// cannot be combined.
    pub async fn list_models(
        &self,
        before_id: Option<&str>,
        after_id: Option<&str>,
        limit: Option<u32>,
    ) -> Result<ModelPage, ConnectorError> {
        require_at_most_one("before_id", before_id.is_some(), "after_id", after_id.is_some())?;
        require_range_opt("limit", limit, 1, 1000)?;
        let query = Query::new()
            .push_opt("before_id", before_id)
            .push_opt("after_id", after_id)
            .push_opt("limit", limit);
        self.client.get("models", &query).await
    }

    pub async fn retrieve_model(&self, model_id: &str) -> Result<ModelInfo, ConnectorError> {
        require_path_segment("model_id", model_id)?;
        self.client
            .get(&format!("models/{model_id}"), &Query::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::mock::MockTransport;

    #[tokio::test]
    async fn list_models_builds_cursor_query() {
        let transport = MockTransport::with_json(200, json!({"data": [], "has_more": false}));
        let claude = Claude::new(transport.clone(), "sk-ant");

        let page = claude
            .list_models(None, Some("claude-3-opus-20240229"), Some(5))
            .await
            .expect("page");
        assert!(page.data.is_empty());
        assert_eq!(
            transport.last_request().url,
            "https://api.anthropic.com/v1/models?after_id=claude-3-opus-20240229&limit=5"
        );
    }

    #[tokio::test]
    async fn list_models_rejects_bad_arguments() {
        let transport = MockTransport::new();
        let claude = Claude::new(transport.clone(), "sk-ant");
        assert!(claude.list_models(Some("a"), Some("b"), None).await.is_err());
        assert!(claude.list_models(None, None, Some(0)).await.is_err());
        assert!(claude.list_models(None, None, Some(1001)).await.is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn retrieve_model_reads_display_name() {
        let transport = MockTransport::with_json(
            200,
            json!({"type": "model", "id": "claude-3-5-haiku-20241022", "display_name": "Claude Haiku 3.5", "created_at": "2024-10-22T00:00:00Z"}),
        );
        let claude = Claude::new(transport, "sk-ant");
        let model = claude
            .retrieve_model("claude-3-5-haiku-20241022")
            .await
            .expect("model");
        assert_eq!(model.display_name.as_deref(), Some("Claude Haiku 3.5"));
        assert_eq!(model.kind.as_deref(), Some("model"));
    }
}
