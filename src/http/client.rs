//! The shared request wrapper every connector delegates to.
//!
//! [`ApiClient`] owns the per-instance configuration (base URL, auth headers, timeout)
//! and turns one method call into exactly one HTTP exchange: serialize, send, check the
//! status, and decode. Non-success responses go through the vendor's error parser so
//! callers always see a [`ConnectorError`] tagged with the provider name.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::{ConnectorError, retry_after_from_headers};

use super::{DynHttpTransport, HttpMethod, HttpRequest, HttpResponse, MultipartForm};

/// Maps a provider name, non-success status and body to the normalized error.
pub type ErrorParser = fn(&'static str, u16, &str, Option<Duration>) -> ConnectorError;

/// Ordered query-string parameters; `None` values are skipped.
///
/// # Examples
///
/// ```
/// use ai_connectors::http::Query;
///
/// let query = Query::new()
///     .push("limit", 20)
///     .push_opt("after", None::<String>)
///     .push("purpose", "fine tune");
/// assert_eq!(query.encode().as_deref(), Some("limit=20&purpose=fine+tune"));
/// assert_eq!(Query::new().encode(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((name.into(), value.to_string()));
        self
    }

    pub fn push_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(name, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// URL-encodes the pairs, or returns `None` when there are none.
    pub fn encode(&self) -> Option<String> {
        if self.pairs.is_empty() {
            return None;
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            serializer.append_pair(name, value);
        }
        Some(serializer.finish())
    }
}

/// Per-connector HTTP client: base URL, default headers, timeout and error parser.
#[derive(Clone)]
pub struct ApiClient {
    provider: &'static str,
    transport: DynHttpTransport,
    base_url: String,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
    parse_error: ErrorParser,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values hold credentials, so only the names are printed.
        let mut header_names: Vec<_> = self.headers.keys().collect();
        header_names.sort();
        f.debug_struct("ApiClient")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("headers", &header_names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiClient {
    /// Creates a client for `provider` rooted at `base_url`.
    ///
    /// `Accept: application/json` is set by default; connectors add their auth headers
    /// with [`ApiClient::with_header`].
    pub fn new(
        provider: &'static str,
        transport: DynHttpTransport,
        base_url: impl Into<String>,
        parse_error: ErrorParser,
    ) -> Self {
        Self {
            provider,
            transport,
            base_url: base_url.into(),
            headers: HashMap::from([("Accept".to_string(), "application/json".to_string())]),
            timeout: None,
            parse_error,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Adds or replaces a default header sent with every request.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.into());
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Case-insensitive lookup of a default header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Joins the base URL, `path` and the encoded query.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ai_connectors::http::{ApiClient, Query};
    /// # use ai_connectors::http::reqwest::default_dyn_transport;
    /// # use ai_connectors::error::ConnectorError;
    /// fn parse(provider: &'static str, status: u16, body: &str, _: Option<std::time::Duration>) -> ConnectorError {
    ///     ConnectorError::api(provider, status, body)
    /// }
    /// let client = ApiClient::new("demo", default_dyn_transport().unwrap(), "https://api.example.com/v1/", parse);
    /// assert_eq!(client.url("models", None), "https://api.example.com/v1/models");
    /// let query = Query::new().push("limit", 5);
    /// assert_eq!(client.url("/files", Some(&query)), "https://api.example.com/v1/files?limit=5");
    /// ```
    pub fn url(&self, path: &str, query: Option<&Query>) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };
        if let Some(encoded) = query.and_then(Query::encode) {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }
        url
    }

    /// GET `path` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, ConnectorError> {
        let request = self.request(HttpMethod::Get, path, Some(query));
        let response = self.execute(request).await?;
        self.decode(response)
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ConnectorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(HttpMethod::Post, path, None)
            .with_json(self.serialize(body)?);
        let response = self.execute(request).await?;
        self.decode(response)
    }

    /// PATCH a JSON body to `path` and decode the JSON response.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ConnectorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(HttpMethod::Patch, path, None)
            .with_json(self.serialize(body)?);
        let response = self.execute(request).await?;
        self.decode(response)
    }

    /// DELETE `path` and decode the JSON response.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConnectorError> {
        let request = self.request(HttpMethod::Delete, path, None);
        let response = self.execute(request).await?;
        self.decode(response)
    }

    /// POST a multipart form to `path` and decode the JSON response.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T, ConnectorError> {
        let request = self.request(HttpMethod::Post, path, None).with_form(form);
        let response = self.execute(request).await?;
        self.decode(response)
    }

    /// GET `path` and return the raw response, for binary downloads.
    pub async fn get_full(&self, path: &str, query: &Query) -> Result<HttpResponse, ConnectorError> {
        let request = self.request(HttpMethod::Get, path, Some(query));
        self.execute(request).await
    }

    /// POST a JSON body and return the raw response, overriding `Accept` when given.
    pub async fn post_full<B>(
        &self,
        path: &str,
        body: &B,
        accept: Option<&str>,
    ) -> Result<HttpResponse, ConnectorError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self
            .request(HttpMethod::Post, path, None)
            .with_json(self.serialize(body)?);
        if let Some(accept) = accept {
            request.set_header("Accept", accept);
        }
        self.execute(request).await
    }

    /// POST a multipart form and return the raw response, overriding `Accept` when given.
    pub async fn post_form_full(
        &self,
        path: &str,
        form: MultipartForm,
        accept: Option<&str>,
    ) -> Result<HttpResponse, ConnectorError> {
        let mut request = self.request(HttpMethod::Post, path, None).with_form(form);
        if let Some(accept) = accept {
            request.set_header("Accept", accept);
        }
        self.execute(request).await
    }

    fn request(&self, method: HttpMethod, path: &str, query: Option<&Query>) -> HttpRequest {
        HttpRequest::new(method, self.url(path, query))
            .with_headers(self.headers.clone())
            .with_timeout(self.timeout)
    }

    fn serialize<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>, ConnectorError> {
        serde_json::to_vec(body).map_err(|err| ConnectorError::Validation {
            message: format!("failed to serialize request: {err}"),
        })
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
        debug!(
            provider = self.provider,
            method = ?request.method,
            url = %request.url,
            "dispatching request"
        );
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| ConnectorError::from_transport(self.provider, err))?;

        if response.is_success() {
            return Ok(response);
        }

        warn!(
            provider = self.provider,
            status = response.status,
            "provider returned an error status"
        );
        let retry_after = retry_after_from_headers(&response.headers);
        Err((self.parse_error)(
            self.provider,
            response.status,
            &response.text(),
            retry_after,
        ))
    }

    fn decode<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ConnectorError> {
        // Some DELETE/cancel endpoints answer with an empty body.
        let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &response.body
        };
        serde_json::from_slice(body).map_err(|err| {
            ConnectorError::decode(self.provider, format!("failed to parse response: {err}"))
        })
    }
}
