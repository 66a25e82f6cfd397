use std::time::Duration;

/// Default base URL of the App Store Connect API.
pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

/// Settings for a report run.
#[derive(Debug, Clone)]
pub struct ReportsConfig {
    /// Base URL of the report service
    pub base_url: String,
    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
    /// Number of items processed at once; output order is kept regardless
    pub max_concurrency: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            max_concurrency: 1,
        }
    }
}
