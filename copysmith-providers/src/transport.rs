//! HTTP capability used by the provider clients

use async_trait::async_trait;
use copysmith_core::{CopysmithError, CopysmithResult, ErrorContext};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("copysmith/", env!("CARGO_PKG_VERSION"));

/// A JSON POST request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl HttpRequest {
    pub fn json(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of header `name`, compared case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Sends requests to a provider
///
/// Implementations return `Err` only when no response was received; any HTTP
/// status, including 4xx and 5xx, is a response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, request: &HttpRequest) -> CopysmithResult<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64) -> CopysmithResult<Self> {
        Ok(Self {
            client: create_http_client(timeout_secs)?,
        })
    }
}

/// Create an HTTP client with the common configuration
fn create_http_client(timeout_secs: u64) -> CopysmithResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CopysmithError::Internal {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

fn header_map(headers: &[(String, String)]) -> CopysmithResult<reqwest::header::HeaderMap> {
    let mut map = reqwest::header::HeaderMap::new();
    for (key, value) in headers {
        let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            CopysmithError::Internal {
                message: format!("Invalid header name '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("post"),
            }
        })?;
        let value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
            CopysmithError::Internal {
                message: format!("Invalid header value for '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("post"),
            }
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: &HttpRequest) -> CopysmithResult<HttpResponse> {
        debug!(url = %request.url, "Sending provider request");

        let response = self
            .client
            .post(&request.url)
            .headers(header_map(&request.headers)?)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| {
                CopysmithError::transport(
                    format!("Request to {} failed: {}", request.url, e),
                    "http_client",
                    e,
                )
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            CopysmithError::transport(
                format!("Failed to read response from {}: {}", request.url, e),
                "http_client",
                e,
            )
        })?;

        debug!(url = %request.url, status = status, "Provider responded");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_headers() {
        let request = HttpRequest::json("https://example.test", json!({}))
            .header("x-api-key", "secret");

        assert_eq!(request.header_value("content-type"), Some("application/json"));
        assert_eq!(request.header_value("X-API-KEY"), Some("secret"));
        assert_eq!(request.header_value("authorization"), None);
    }

    #[test]
    fn test_response_status() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(!HttpResponse::new(429, "").is_success());

        let parsed: Value = HttpResponse::new(200, r#"{"a":1}"#).json().unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let headers = vec![("bad header".to_string(), "v".to_string())];
        assert!(header_map(&headers).is_err());
    }

    #[test]
    fn test_client_builds() {
        assert!(ReqwestTransport::new(5).is_ok());
    }
}
