//! HTTP transport for DAV requests
//!
//! The transport is a trait so the client can run against a recording fake
//! in tests and against reqwest in production.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use domain::CalendarCredentials;
use reqwest::header::{ETAG, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::error::CalDavError;

/// One authenticated DAV request
#[derive(Debug, Clone)]
pub struct DavRequest {
    pub method: Method,
    pub url: Url,
    pub credentials: CalendarCredentials,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
    /// Short operation name used in errors and logs (`query`, `create`, ...)
    pub operation: &'static str,
}

impl DavRequest {
    #[must_use]
    pub fn new(
        method: Method,
        url: Url,
        credentials: CalendarCredentials,
        timeout: Duration,
        operation: &'static str,
    ) -> Self {
        Self {
            method,
            url,
            credentials,
            headers: Vec::new(),
            body: None,
            timeout,
            operation,
        }
    }

    /// Add a request header
    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Set the request body
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header that was set on this request
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status, headers and body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResult {
    /// The response ETag, if the server sent one
    pub fn etag(&self) -> Option<String> {
        self.headers
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    }

    /// The body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes DAV requests
#[async_trait]
pub trait CalDavTransport: Send + Sync {
    /// Send a request and return whatever the server answered
    ///
    /// Non-success statuses are not errors at this level.
    async fn execute(&self, request: DavRequest) -> Result<HttpResult, CalDavError>;
}

/// reqwest-backed transport with basic auth and per-request timeouts
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport
    pub fn new() -> Result<Self, CalDavError> {
        let client = Client::builder()
            .user_agent(concat!("calendar-skill/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CalDavError::ConnectionFailed(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_send_error(e: &reqwest::Error) -> CalDavError {
    if e.is_timeout() {
        return CalDavError::Timeout;
    }
    CalDavError::ConnectionFailed(e.to_string())
}

#[async_trait]
impl CalDavTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url, operation = request.operation))]
    async fn execute(&self, request: DavRequest) -> Result<HttpResult, CalDavError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .basic_auth(
                request.credentials.username(),
                Some(request.credentials.password()),
            )
            .timeout(request.timeout);

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| map_send_error(&e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| map_send_error(&e))?;

        debug!(status = %status, body_length = body.len(), "DAV response received");

        Ok(HttpResult {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use secrecy::SecretString;

    use super::*;

    fn request() -> DavRequest {
        DavRequest::new(
            Method::GET,
            Url::parse("https://caldav.example.test/family/a.ics").unwrap(),
            CalendarCredentials::new("alice", SecretString::from("secret")),
            Duration::from_secs(5),
            "fetch",
        )
    }

    #[test]
    fn builder_collects_headers_and_body() {
        let req = request().header("If-Match", "\"v1\"").body("BEGIN:VCALENDAR");
        assert_eq!(req.header_value("if-match"), Some("\"v1\""));
        assert_eq!(req.body.as_deref(), Some("BEGIN:VCALENDAR"));
        assert_eq!(req.header_value("If-None-Match"), None);
    }

    #[test]
    fn debug_does_not_leak_password() {
        let debug = format!("{:?}", request());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn etag_is_read_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"v7\""));
        let result = HttpResult {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"body"),
        };
        assert_eq!(result.etag().as_deref(), Some("\"v7\""));
        assert_eq!(result.text(), "body");
    }

    #[test]
    fn missing_etag_is_none() {
        let result = HttpResult {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert!(result.etag().is_none());
    }

    #[test]
    fn transport_builds() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
