//! In-memory transport used by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{HttpBody, HttpRequest, HttpResponse, HttpTransport, MultipartForm, TransportError};

/// Replays queued responses and records every request it receives.
///
/// When the queue is empty the last queued response is replayed again, which keeps
/// single-response tests short.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    last: Mutex<Option<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_json(status: u16, body: Value) -> Arc<Self> {
        let transport = Self::new();
        transport.push_json(status, body);
        transport
    }

    pub(crate) fn push_json(&self, status: u16, body: Value) {
        self.push_raw(
            status,
            body.to_string().into_bytes(),
            &[("content-type", "application/json")],
        );
    }

    pub(crate) fn push_raw(&self, status: u16, body: Vec<u8>, headers: &[(&str, &str)]) {
        let headers: HashMap<String, String> = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.push(Ok(HttpResponse {
            status,
            headers,
            body,
        }));
    }

    pub(crate) fn push_error(&self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(&self, response: Result<HttpResponse, TransportError>) {
        self.responses
            .lock()
            .expect("mock transport lock")
            .push_back(response);
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().expect("mock transport lock").len()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .expect("mock transport lock")
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .expect("mock transport lock")
            .push(request);
        let next = self
            .responses
            .lock()
            .expect("mock transport lock")
            .pop_front();
        let mut last = self.last.lock().expect("mock transport lock");
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().expect("mock transport has no queued response"),
        }
    }
}

impl HttpRequest {
    /// Parses the JSON body of a recorded request.
    pub(crate) fn json_body(&self) -> Value {
        match &self.body {
            Some(HttpBody::Json(bytes)) => {
                serde_json::from_slice(bytes).expect("request body should be JSON")
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    /// Returns the multipart body of a recorded request.
    pub(crate) fn form_body(&self) -> &MultipartForm {
        match &self.body {
            Some(HttpBody::Multipart(form)) => form,
            other => panic!("expected multipart body, got {other:?}"),
        }
    }
}
