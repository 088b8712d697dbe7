use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub execution_timeout_ms: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            execution_timeout_ms: env::var("ACTIONHUB_EXECUTION_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000),
            log_level: env::var("ACTIONHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
