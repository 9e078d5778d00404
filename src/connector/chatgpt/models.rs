use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::Query;
use crate::validate::require_path_segment;

use super::ChatGpt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub owned_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub object: Option<String>,
    pub data: Vec<Model>,
}

/// Acknowledgement returned by OpenAI delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedObject {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    pub deleted: bool,
}

impl ChatGpt {
    /// Lists the models available to the API key.
    pub async fn list_models(&self) -> Result<ModelList, ConnectorError> {
        self.client.get("models", &Query::new()).await
    }

    /// Retrieves a single model.
    pub async fn retrieve_model(&self, model: &str) -> Result<Model, ConnectorError> {
        require_path_segment("model", model)?;
        self.client.get(&format!("models/{model}"), &Query::new()).await
    }

    /// Deletes a fine-tuned model owned by the organization.
    pub async fn delete_model(&self, model: &str) -> Result<DeletedObject, ConnectorError> {
        require_path_segment("model", model)?;
        self.client.delete(&format!("models/{model}")).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connector::Connector;
    use crate::http::HttpMethod;
    use crate::http::mock::MockTransport;

    #[tokio::test]
    async fn list_models_through_connector_trait() {
        let transport = MockTransport::with_json(
            200,
            json!({
                "object": "list",
                "data": [
                    {"id": "gpt-4o", "object": "model", "created": 1, "owned_by": "system"},
                    {"id": "ft:gpt-4o-mini:acme::abc", "object": "model", "created": 2, "owned_by": "acme"}
                ]
            }),
        );
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let models = Connector::list_models(&chatgpt).await.expect("models");
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].owned_by.as_deref(), Some("acme"));
        assert_eq!(transport.last_request().url, "https://api.openai.com/v1/models");
    }

    #[tokio::test]
    async fn delete_model_uses_delete_verb() {
        let transport = MockTransport::with_json(
            200,
            json!({"id": "ft:gpt-4o-mini:acme::abc", "object": "model", "deleted": true}),
        );
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let deleted = chatgpt
            .delete_model("ft:gpt-4o-mini:acme::abc")
            .await
            .expect("delete");
        assert!(deleted.deleted);
        let sent = transport.last_request();
        assert_eq!(sent.method, HttpMethod::Delete);
        assert_eq!(sent.url, "https://api.openai.com/v1/models/ft:gpt-4o-mini:acme::abc");
    }

    #[tokio::test]
    async fn retrieve_model_maps_not_found() {
        let transport = MockTransport::with_json(
            404,
            json!({"error": {"message": "The model 'nope' does not exist", "type": "invalid_request_error", "code": "model_not_found"}}),
        );
        let chatgpt = ChatGpt::new(transport, "sk-test");

        let err = chatgpt.retrieve_model("nope").await.expect_err("missing");
        assert!(matches!(err, ConnectorError::NotFound { provider: "chatgpt", .. }));
        assert!(chatgpt.retrieve_model("a/b").await.is_err());
    }
}
