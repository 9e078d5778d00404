use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::ConnectorError;
use crate::http::Query;
use crate::validate::{require_max_len, require_non_empty, require_path_segment, require_range_opt};

use super::ChatGpt;

/// Body of `POST /fine_tuning/jobs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FineTuningJobRequest {
    pub model: String,
    pub training_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Legacy `hyperparameters` object (`n_epochs`, `batch_size`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperparameters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl FineTuningJobRequest {
    pub fn new(model: impl Into<String>, training_file: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            training_file: training_file.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        require_non_empty("training_file", &self.training_file)?;
        if let Some(suffix) = &self.suffix {
            require_max_len("suffix", suffix, 64)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuningJob {
    pub id: String,
    pub model: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<u64>,
    #[serde(default)]
    pub finished_at: Option<u64>,
    #[serde(default)]
    pub fine_tuned_model: Option<String>,
    #[serde(default)]
    pub training_file: Option<String>,
    #[serde(default)]
    pub validation_file: Option<String>,
    #[serde(default)]
    pub trained_tokens: Option<u64>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuningJobList {
    pub data: Vec<FineTuningJob>,
    #[serde(default)]
    pub has_more: bool,
}

impl ChatGpt {
    /// Starts a fine-tuning job from an uploaded training file.
    pub async fn create_fine_tuning_job(
        &self,
        request: &FineTuningJobRequest,
    ) -> Result<FineTuningJob, ConnectorError> {
        request.validate()?;
        self.client.post("fine_tuning/jobs", request).await
    }

    /// Lists fine-tuning jobs, paginated by the id of the last job seen.
    pub async fn list_fine_tuning_jobs(
        &self,
        after: Option<&str>,
        limit: Option<u32>,
    ) -> Result<FineTuningJobList, ConnectorError> {
        require_range_opt("limit", limit, 1, 100)?;
        let query = Query::new().push_opt("after", after).push_opt("limit", limit);
        self.client.get("fine_tuning/jobs", &query).await
    }

    pub async fn retrieve_fine_tuning_job(
        &self,
        job_id: &str,
    ) -> Result<FineTuningJob, ConnectorError> {
        require_path_segment("job_id", job_id)?;
        self.client
            .get(&format!("fine_tuning/jobs/{job_id}"), &Query::new())
            .await
    }

    /// Cancels a running job.
    pub async fn cancel_fine_tuning_job(
        &self,
        job_id: &str,
    ) -> Result<FineTuningJob, ConnectorError> {
        require_path_segment("job_id", job_id)?;
        self.client
            .post(&format!("fine_tuning/jobs/{job_id}/cancel"), &json!({}))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::http::mock::MockTransport;

    fn job_json(status: &str) -> Value {
        json!({
            "object": "fine_tuning.job",
            "id": "ftjob-1",
            "model": "gpt-4o-mini-2024-07-18",
            "status": status,
            "created_at": 1700000000,
            "training_file": "file-abc",
            "estimated_finish": null
        })
    }

    #[tokio::test]
    async fn create_job_posts_request() {
        let transport = MockTransport::with_json(200, job_json("validating_files"));
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let mut request = FineTuningJobRequest::new("gpt-4o-mini-2024-07-18", "file-abc");
        request.suffix = Some("support-bot".to_string());
        let job = chatgpt.create_fine_tuning_job(&request).await.expect("job");
        assert_eq!(job.status, "validating_files");
        assert!(job.extra.contains_key("estimated_finish"));

        let body = transport.last_request().json_body();
        assert_eq!(body["suffix"], "support-bot");
        assert!(body.get("validation_file").is_none());
    }

    #[test]
    fn suffix_is_limited_to_64_chars() {
        let mut request = FineTuningJobRequest::new("m", "file-abc");
        request.suffix = Some("s".repeat(65));
        assert!(request.validate().is_err());
    }

    #[tokio::test]
    async fn list_jobs_paginates_and_checks_limit() {
        let transport = MockTransport::with_json(
            200,
            json!({"object": "list", "data": [job_json("running")], "has_more": true}),
        );
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let jobs = chatgpt
            .list_fine_tuning_jobs(Some("ftjob-0"), Some(10))
            .await
            .expect("jobs");
        assert!(jobs.has_more);
        assert_eq!(
            transport.last_request().url,
            "https://api.openai.com/v1/fine_tuning/jobs?after=ftjob-0&limit=10"
        );
        assert!(chatgpt.list_fine_tuning_jobs(None, Some(101)).await.is_err());
    }

    #[tokio::test]
    async fn cancel_posts_to_cancel_endpoint() {
        let transport = MockTransport::with_json(200, job_json("cancelled"));
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let job = chatgpt.cancel_fine_tuning_job("ftjob-1").await.expect("cancel");
        assert_eq!(job.status, "cancelled");
        let sent = transport.last_request();
        assert_eq!(sent.method, HttpMethod::Post);
        assert!(sent.url.ends_with("/fine_tuning/jobs/ftjob-1/cancel"));
    }
}
