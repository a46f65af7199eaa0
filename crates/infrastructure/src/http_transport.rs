use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use warden_core::{AppError, AppResult};

/// Outbound HTTP request understood by every transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Optional JSON body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Adds one header, rejecting values that are not valid header text.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> AppResult<Self> {
        let value = HeaderValue::from_str(value).map_err(|error| {
            AppError::Validation(format!("invalid value for header '{name}': {error}"))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Attaches a JSON body and the matching content type.
    #[must_use]
    pub fn with_json_body(mut self, body: Vec<u8>) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(body);
        self
    }
}

/// Response body stream. Dropping the value closes the underlying connection
/// resources.
#[async_trait]
pub trait ResponseBody: Send {
    /// Reads the remaining body to completion.
    async fn read_all(&mut self) -> AppResult<Vec<u8>>;
}

/// Response returned by a transport.
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Unread body.
    pub body: Box<dyn ResponseBody>,
}

impl Debug for HttpResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    /// Consumes the response and returns its status and full body.
    pub async fn into_parts(mut self) -> AppResult<(StatusCode, Vec<u8>)> {
        let body = self.body.read_all().await?;
        Ok((self.status, body))
    }
}

/// Port for sending HTTP requests.
///
/// An `Err` returned by `send` is a transport-level failure (DNS, connect,
/// timeout), except `AppError::Validation` for a request that could not be
/// built. HTTP error statuses are returned as responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one request.
    async fn send(&self, request: &HttpRequest) -> AppResult<HttpResponse>;
}

/// `reqwest`-backed transport.
///
/// The client is expected to carry authentication as default headers.
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport around an already-authenticated client.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

struct ReqwestBody {
    response: Option<reqwest::Response>,
}

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn read_all(&mut self) -> AppResult<Vec<u8>> {
        let Some(response) = self.response.take() else {
            return Ok(Vec::new());
        };

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|error| AppError::Unavailable(format!("failed to read response body: {error}")))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> AppResult<HttpResponse> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|error| {
            if error.is_builder() {
                return AppError::Validation(format!(
                    "{} {} is not a valid request: {error}",
                    request.method, request.url
                ));
            }

            AppError::Unavailable(format!(
                "{} {} transport error: {error}",
                request.method, request.url
            ))
        })?;

        Ok(HttpResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Box::new(ReqwestBody {
                response: Some(response),
            }),
        })
    }
}
