//! Envelope-aware HTTP client.
//!
//! # Design
//! `ApiClient` holds a base URL, default headers, and a `Transport`, and
//! carries no mutable state between calls. Each verb is split the same way:
//! a `build_*` method produces an `HttpRequest`, `parse` turns an
//! `HttpResponse` into an `Envelope`, and `send` glues the two around the
//! transport.
//!
//! The plain verb methods (`get`, `post`, ...) never fail. Transport errors,
//! non-2xx statuses, and unparsable bodies are logged and collapsed into an
//! error envelope, so callers branch on `Envelope::is_success` alone. The
//! `try_*` variants expose the underlying `ApiError` instead.

use serde::Serialize;

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::form::FormData;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::options::{merge_headers, RequestOptions};
use crate::transport::{ReqwestTransport, Transport};

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// HTTP client speaking the `{code, message, data}` envelope.
#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    base_url: String,
    default_headers: Vec<(String, String)>,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client with default timeouts rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::from_config(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(&config.base_url, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: Vec::new(),
            transport,
        }
    }

    /// Header sent with every request unless a call overrides it.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let header = (name.into(), value.into());
        merge_headers(&mut self.default_headers, std::slice::from_ref(&header));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; anything else is joined to the base URL.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub fn build_get(&self, path: &str, options: &RequestOptions) -> HttpRequest {
        self.build(HttpMethod::Get, path, None, options)
    }

    pub fn build_delete(&self, path: &str, options: &RequestOptions) -> HttpRequest {
        self.build(HttpMethod::Delete, path, None, options)
    }

    pub fn build_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = json_body(body)?;
        Ok(self.build(HttpMethod::Post, path, Some(body), options))
    }

    pub fn build_put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = json_body(body)?;
        Ok(self.build(HttpMethod::Put, path, Some(body), options))
    }

    pub fn build_post_form(&self, path: &str, form: FormData, options: &RequestOptions) -> HttpRequest {
        self.build(HttpMethod::Post, path, Some(RequestBody::Form(form)), options)
    }

    pub fn build_put_form(&self, path: &str, form: FormData, options: &RequestOptions) -> HttpRequest {
        self.build(HttpMethod::Put, path, Some(RequestBody::Form(form)), options)
    }

    /// Reject non-2xx statuses, then read the body as an envelope.
    ///
    /// A 2xx envelope with a non-zero code is still `Ok`; the code is the
    /// caller's to inspect.
    pub fn parse(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub async fn send(&self, request: HttpRequest) -> Result<Envelope, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        tracing::debug!(status = response.status, "received response");
        self.parse(response)
    }

    pub async fn try_get(&self, path: &str, options: &RequestOptions) -> Result<Envelope, ApiError> {
        self.send(self.build_get(path, options)).await
    }

    pub async fn try_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<Envelope, ApiError> {
        self.send(self.build_post(path, body, options)?).await
    }

    pub async fn try_put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<Envelope, ApiError> {
        self.send(self.build_put(path, body, options)?).await
    }

    pub async fn try_delete(&self, path: &str, options: &RequestOptions) -> Result<Envelope, ApiError> {
        self.send(self.build_delete(path, options)).await
    }

    pub async fn get(&self, path: &str, options: &RequestOptions) -> Envelope {
        collapse(self.try_get(path, options).await)
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Envelope {
        collapse(self.try_post(path, body, options).await)
    }

    pub async fn post_form(&self, path: &str, form: FormData, options: &RequestOptions) -> Envelope {
        collapse(self.send(self.build_post_form(path, form, options)).await)
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Envelope {
        collapse(self.try_put(path, body, options).await)
    }

    pub async fn put_form(&self, path: &str, form: FormData, options: &RequestOptions) -> Envelope {
        collapse(self.send(self.build_put_form(path, form, options)).await)
    }

    pub async fn delete(&self, path: &str, options: &RequestOptions) -> Envelope {
        collapse(self.try_delete(path, options).await)
    }

    fn build(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        options: &RequestOptions,
    ) -> HttpRequest {
        let mut headers = match body {
            Some(RequestBody::Form(_)) => Vec::new(),
            _ => vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
        };
        merge_headers(&mut headers, &self.default_headers);
        merge_headers(&mut headers, &options.headers);

        HttpRequest {
            method,
            url: self.resolve(path),
            headers,
            body,
            timeout: options.timeout,
        }
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_string(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        status: response.status,
        reason: response.reason().to_string(),
    })
}

fn collapse(result: Result<Envelope, ApiError>) -> Envelope {
    result.unwrap_or_else(|err| {
        tracing::error!(error = %err, "API request failed");
        Envelope::from(err)
    })
}
