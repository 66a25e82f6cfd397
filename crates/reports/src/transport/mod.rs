//! HTTP seam between the pipeline and the remote service.
//!
//! The resolver and retriever only need two capabilities: "GET this URL as
//! JSON with a bearer token" and "GET these bytes". Production code uses
//! [`HttpTransport`]; tests substitute a recording stub.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

/// Outbound request capability used by the pipeline.
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// GET a JSON document, authenticated with `Authorization: Bearer <token>`.
    async fn get_json(&self, url: &str, bearer: &str) -> Result<Value>;

    /// GET a binary body; pre-signed URLs pass no token.
    async fn get_bytes(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>>;
}

/// Join a base URL, a path and URL-encoded query pairs.
pub fn build_url(base_url: &str, path: &str, params: &[(&str, &str)]) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    if !params.is_empty() {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        url = format!("{}?{}", url, query.join("&"));
    }
    url
}
