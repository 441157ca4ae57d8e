use crate::retry::RetryPolicy;
use envconfig::Envconfig;
use std::time::Duration;

#[derive(Debug, Envconfig, Clone)]
pub struct Config {
    /// Statistics API base URL
    #[envconfig(from = "API_BASE_URL", default = "https://api.minecraft-italia.net/v1")]
    pub api_base_url: String,

    /// Freshness window for cached server metadata, in milliseconds
    #[envconfig(from = "CACHE_TTL_MS", default = "300000")]
    pub cache_ttl_ms: u64,

    /// Total attempts per request, first one included
    #[envconfig(from = "RETRY_MAX_ATTEMPTS", default = "3")]
    pub max_attempts: u32,

    /// First backoff delay in milliseconds; doubles on each retry
    #[envconfig(from = "RETRY_BASE_DELAY_MS", default = "500")]
    pub base_delay_ms: u64,

    /// Per-attempt request timeout in milliseconds
    #[envconfig(from = "REQUEST_TIMEOUT_MS", default = "10000")]
    pub timeout_ms: u64,

    /// Minimum spacing between requests in milliseconds
    #[envconfig(from = "MIN_INTERVAL_MS", default = "1000")]
    pub min_interval_ms: u64,

    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    #[envconfig(from = "PLAYER_NAME")]
    pub player_name: Option<String>,

    #[envconfig(from = "SERVER_NAME")]
    pub server_name: Option<String>,

    /// Server page URL, `.../server/<slug>`
    #[envconfig(from = "SERVER_URL")]
    pub server_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            api_base_url: "https://api.minecraft-italia.net/v1".to_string(),
            cache_ttl_ms: 300_000,
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            timeout_ms: policy.timeout.as_millis() as u64,
            min_interval_ms: policy.min_interval.as_millis() as u64,
            log_level: "info".to_string(),
            player_name: None,
            server_name: None,
            server_url: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envconfig::Error> {
        Config::init_from_env()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.timeout_ms),
            Duration::from_millis(self.min_interval_ms),
        )
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}
