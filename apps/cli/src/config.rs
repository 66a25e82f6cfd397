use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use appstore_reports::{Credential, ReportsConfig, DEFAULT_BASE_URL};

pub struct Config {
    pub reports: ReportsConfig,
    pub credential: Credential,
    pub items_file: PathBuf,
    pub output_dir: PathBuf,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };

        let base_url = lookup("ASR_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_ms: u64 = lookup("ASR_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .unwrap_or(30000);
        let max_concurrency: usize = lookup("ASR_MAX_CONCURRENCY")
            .unwrap_or_else(|| "1".into())
            .parse()
            .unwrap_or(1);

        let private_key = match lookup("ASR_PRIVATE_KEY_FILE") {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read ASR_PRIVATE_KEY_FILE {}", path))?,
            None => required("ASR_PRIVATE_KEY")?,
        };

        let credential = Credential::new(
            required("ASR_ISSUER_ID")?,
            required("ASR_KEY_ID")?,
            private_key,
        );

        Ok(Self {
            reports: ReportsConfig {
                base_url,
                request_timeout: Duration::from_millis(timeout_ms),
                max_concurrency,
            },
            credential,
            items_file: PathBuf::from(required("ASR_ITEMS_FILE")?),
            output_dir: PathBuf::from(lookup("ASR_OUTPUT_DIR").unwrap_or_else(|| "./out".into())),
            log_json: lookup("ASR_LOG_JSON").is_some_and(|v| v == "1" || v == "true"),
        })
    }
}
