use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};

use super::{
    DynHttpTransport, FormPart, HttpBody, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    MultipartForm, TransportError,
};

/// Default [`HttpTransport`] backed by `reqwest`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps a caller-configured `reqwest::Client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with default settings.
    pub fn default_client() -> Result<Self, TransportError> {
        Self::with_connect_timeout(None)
    }

    /// Builds a client that gives up on establishing connections after `timeout`.
    pub fn with_connect_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder.build().map(Self::new).map_err(|err| {
            TransportError::InvalidRequest(format!("failed to create reqwest client: {err}"))
        })
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn build_request(
        &self,
        mut request: HttpRequest,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        let method = Self::method(request.method);
        let mut builder = self.client.request(method, &request.url);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        for (name, value) in request.headers.drain() {
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| TransportError::InvalidRequest(format!("invalid header name: {err}")))?;
            let header_value = reqwest::header::HeaderValue::from_str(&value).map_err(|err| {
                TransportError::InvalidRequest(format!(
                    "invalid header value for {header_name}: {err}"
                ))
            })?;
            builder = builder.header(header_name, header_value);
        }

        match request.body.take() {
            Some(HttpBody::Json(body)) => builder = builder.body(body),
            Some(HttpBody::Multipart(form)) => builder = builder.multipart(Self::form(form)?),
            None => {}
        }

        Ok(builder)
    }

    fn form(form: MultipartForm) -> Result<Form, TransportError> {
        let mut multipart = Form::new();
        for part in form.parts {
            multipart = match part {
                FormPart::Text { name, value } => multipart.text(name, value),
                FormPart::File {
                    name,
                    filename,
                    mime_type,
                    data,
                } => {
                    let mut file = Part::bytes(data).file_name(filename);
                    if let Some(mime) = mime_type {
                        file = file.mime_str(&mime).map_err(|err| {
                            TransportError::InvalidRequest(format!("invalid mime type {mime}: {err}"))
                        })?;
                    }
                    multipart.part(name, file)
                }
            };
        }
        Ok(multipart)
    }

    fn headers_to_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    fn map_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Connect(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = response.status().as_u16();
        let headers = Self::headers_to_map(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TransportError::Timeout(err.to_string())
                } else {
                    TransportError::Body(err.to_string())
                }
            })?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Convenience constructor for a shareable default transport.
pub fn default_dyn_transport() -> Result<DynHttpTransport, TransportError> {
    Ok(Arc::new(ReqwestTransport::default_client()?))
}
