use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/spendly.toml";

/// Connection settings for the Spendly backend.
///
/// Layered as defaults, then an optional TOML file, then `SPENDLY_*`
/// environment variables (e.g. `SPENDLY_API_BASE_URL`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout_ms: u64,
    /// Base URL for uploaded files. Derived from `api_base_url` when empty.
    pub storage_url: String,
    /// Sent as `Accept-Language` so the backend localizes names.
    pub locale: String,
    pub device_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spendly.money/api".to_string(),
            timeout_ms: 30_000,
            storage_url: String::new(),
            locale: "en".to_string(),
            device_name: "rust - spendly-core".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(config::Environment::with_prefix("SPENDLY"));
        let settings: ClientConfig = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn storage_url(&self) -> String {
        if !self.storage_url.is_empty() {
            return self.storage_url.trim_end_matches('/').to_string();
        }
        let base = self.api_base_url.trim_end_matches('/');
        base.strip_suffix("/api").unwrap_or(base).to_string()
    }
}
