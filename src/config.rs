//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Exchange Credentials ===
    /// Application key sent with every exchange request.
    pub exchange_app_key: String,

    /// Session token sent with every exchange request.
    pub exchange_session_token: String,

    /// Base URL of the exchange betting API.
    #[serde(default = "default_base_url")]
    pub exchange_base_url: String,

    // === Refresh ===
    /// Seconds between refresh sweeps over active sweepstakes (0 disables).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    // === Server Configuration ===
    /// HTTP server port for the sweepstakes API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP client timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// HTTP connection pool size per host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    // === Observability ===
    /// Expose Prometheus metrics.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Port for the Prometheus scrape endpoint.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_base_url() -> String {
    "https://api.betfair.com/exchange/betting/rest/v1".to_string()
}

fn default_refresh_interval() -> u64 {
    900
}

fn default_port() -> u16 {
    8080
}

fn default_http_timeout_ms() -> u64 {
    2000
}

fn default_http_pool_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.exchange_app_key.is_empty() {
            return Err("EXCHANGE_APP_KEY is required".to_string());
        }

        if self.exchange_session_token.is_empty() {
            return Err("EXCHANGE_SESSION_TOKEN is required".to_string());
        }

        if url::Url::parse(&self.exchange_base_url).is_err() {
            return Err(format!(
                "EXCHANGE_BASE_URL is not a valid URL: {}",
                self.exchange_base_url
            ));
        }

        if self.metrics_enabled && self.metrics_port == self.port {
            return Err("METRICS_PORT must differ from PORT".to_string());
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            exchange_app_key: "test-app-key".to_string(),
            exchange_session_token: "test-session".to_string(),
            exchange_base_url: default_base_url(),
            refresh_interval_secs: default_refresh_interval(),
            port: default_port(),
            http_timeout_ms: default_http_timeout_ms(),
            http_pool_size: default_http_pool_size(),
            metrics_enabled: true,
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}
