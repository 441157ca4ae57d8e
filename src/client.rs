use crate::config::Config;
use crate::error::{ResolverError, Result};
use crate::metrics::MetricsCollector;
use crate::retry::{retry_with_backoff, with_timeout, RetryPolicy};
use crate::throttle::Throttle;
use crate::wire::{ServerInfo, VoteRecord};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

pub const SERVER_INFO_PATH: &str = "server/info";
pub const VOTES_PATH: &str = "server/votes";

/// Read access to the remote statistics API
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Server metadata for a slug; `Ok(None)` when the body carries no server id.
    async fn fetch_server_info(&self, slug: &str) -> Result<Option<ServerInfo>>;

    /// Today's votes for a server id
    async fn fetch_votes_today(&self, server_id: &str) -> Result<Vec<VoteRecord>>;
}

/// HTTP client applying throttle, per-attempt timeout and retry policy.
///
/// One instance per process; every request holds the throttle for its full
/// duration, so requests never overlap.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    policy: RetryPolicy,
    throttle: Throttle,
    metrics: MetricsCollector,
}

impl ApiClient {
    pub fn new(base_url: &str, policy: RetryPolicy, metrics: MetricsCollector) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ResolverError::Configuration(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("vote_resolver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ResolverError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            throttle: Throttle::new(policy.min_interval),
            policy,
            metrics,
        })
    }

    pub fn from_config(config: &Config, metrics: MetricsCollector) -> Result<Self> {
        Self::new(&config.api_base_url, config.retry_policy(), metrics)
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Base URL plus `path`, with every parameter that has a value appended.
    pub fn build_url(&self, path: &str, params: &[(&str, Option<&str>)]) -> Url {
        let mut url = self.base_url.clone();
        {
            // `Url::join` would drop the last base segment without a trailing slash
            let base_path = url.path().trim_end_matches('/').to_string();
            url.set_path(&format!("{}/{}", base_path, path.trim_start_matches('/')));
        }

        let present: Vec<_> = params
            .iter()
            .filter_map(|(key, value)| value.map(|v| (*key, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }
        url
    }

    /// Issues a throttled GET and returns the parsed JSON body.
    pub async fn request(&self, path: &str, params: &[(&str, Option<&str>)]) -> Result<Value> {
        let url = self.build_url(path, params);
        let _permit = self.throttle.acquire().await;

        let result = retry_with_backoff(&self.policy, |attempt| {
            if attempt > 1 {
                self.metrics.record_retry(path);
            }
            let url = url.clone();
            async move {
                debug!(%url, attempt, "Dispatching API request");
                with_timeout(self.policy.timeout, self.dispatch(url)).await
            }
        })
        .await;

        self.metrics.record_request(path, result.is_ok());
        result
    }

    async fn dispatch(&self, url: Url) -> Result<Value> {
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolverError::Timeout(self.policy.timeout)
            } else {
                ResolverError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ResolverError::Parse(format!("{} from {}", e, url)))
    }
}

#[async_trait]
impl StatsApi for ApiClient {
    async fn fetch_server_info(&self, slug: &str) -> Result<Option<ServerInfo>> {
        let body = self.request(SERVER_INFO_PATH, &[("slug", Some(slug))]).await?;
        Ok(ServerInfo::from_json(&body))
    }

    async fn fetch_votes_today(&self, server_id: &str) -> Result<Vec<VoteRecord>> {
        let body = self
            .request(VOTES_PATH, &[("serverId", Some(server_id)), ("period", Some("today"))])
            .await?;
        Ok(VoteRecord::list_from_json(&body))
    }
}
