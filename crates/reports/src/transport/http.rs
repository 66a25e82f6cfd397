//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;

use super::ReportTransport;
use crate::errors::{ReportsError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// HTTP client for the report service and its download hosts.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportsError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn headers(bearer: Option<&str>, accept: &'static str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));

        if let Some(token) = bearer {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ReportsError::credential("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Turn a non-success response into an API error with the service's message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("[HttpTransport] Request failed ({}): {}", status, body);

        if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&body) {
            if let Some(first) = parsed.errors.into_iter().next() {
                let code = first.code.unwrap_or_else(|| status.to_string());
                let text = first.detail.or(first.title).unwrap_or_default();
                return Err(ReportsError::api(
                    status.as_u16(),
                    format!("{}: {}", code, text),
                ));
            }
        }

        Err(ReportsError::api(
            status.as_u16(),
            format!(
                "Request failed: {}",
                body.chars().take(200).collect::<String>()
            ),
        ))
    }
}

#[async_trait]
impl ReportTransport for HttpTransport {
    async fn get_json(&self, url: &str, bearer: &str) -> Result<Value> {
        debug!("[HttpTransport] GET {}", url);

        let response = self
            .client
            .get(url)
            .headers(Self::headers(Some(bearer), "application/json")?)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ReportsError::from)
    }

    async fn get_bytes(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>> {
        debug!(
            "[HttpTransport] GET {} (binary, authenticated={})",
            url.split('?').next().unwrap_or(url),
            bearer.is_some()
        );

        let response = self
            .client
            .get(url)
            .headers(Self::headers(bearer, "application/a-gzip")?)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        assert!(HttpTransport::new().is_ok());
        assert!(HttpTransport::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_headers_carry_bearer_token() {
        let headers = HttpTransport::headers(Some("abc.def.ghi"), "application/json").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc.def.ghi");

        let headers = HttpTransport::headers(None, "application/a-gzip").unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_header_rejects_control_characters() {
        let err = HttpTransport::headers(Some("bad\ntoken"), "application/json").unwrap_err();
        assert!(matches!(err, ReportsError::Credential(_)));
    }
}
