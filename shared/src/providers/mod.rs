use std::{
    panic::AssertUnwindSafe,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, instrument, warn};

use crate::{Provider, ProviderStats};

pub mod codeforces;
pub mod github;
pub mod leetcode;
pub mod metrics;

pub use metrics::{FetchOutcome, ProviderMetrics};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
pub const USER_AGENT: &str = "aura-stats-service";

/// One provider-specific lookup. Implementations may fail in any way they like,
/// the [`ProviderAdapter`] wrapping them turns every failure into zero stats.
#[async_trait]
pub trait StatsSource: Send + Sync {
    fn provider(&self) -> Provider;

    async fn fetch(&self, handle: &str) -> anyhow::Result<ProviderStats>;
}

#[derive(Clone)]
pub struct ProviderAdapter {
    source: Arc<dyn StatsSource>,
    timeout: Duration,
    metrics: Option<Arc<ProviderMetrics>>,
}

impl ProviderAdapter {
    pub fn new(source: impl StatsSource + 'static, timeout: Duration) -> Self {
        Self {
            source: Arc::new(source),
            timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ProviderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn provider(&self) -> Provider {
        self.source.provider()
    }

    /// Never fails: an empty handle, a timeout, an error or a panic in the source
    /// all produce the provider's zero stats.
    #[instrument(skip(self), fields(provider = %self.provider()))]
    pub async fn fetch_stats(&self, handle: &str) -> ProviderStats {
        let provider = self.provider();
        let handle = handle.trim();
        if handle.is_empty() {
            debug!("No handle for {provider}, skipping");
            self.record(FetchOutcome::Skipped, None);
            return ProviderStats::zero(provider);
        }

        let started = Instant::now();
        let fetch = AssertUnwindSafe(self.source.fetch(handle)).catch_unwind();
        let (stats, outcome) = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(Ok(stats))) if stats.provider() == provider => (stats, FetchOutcome::Ok),
            Ok(Ok(Ok(stats))) => {
                warn!(
                    "{provider} source for {handle} returned {} stats",
                    stats.provider()
                );
                (ProviderStats::zero(provider), FetchOutcome::Failed)
            }
            Ok(Ok(Err(e))) => {
                warn!("Failed to fetch {provider} stats for {handle}: {e:#}");
                (ProviderStats::zero(provider), FetchOutcome::Failed)
            }
            Ok(Err(_)) => {
                warn!("{provider} source panicked while fetching {handle}");
                (ProviderStats::zero(provider), FetchOutcome::Failed)
            }
            Err(_) => {
                warn!(
                    "Timed out fetching {provider} stats for {handle} after {:?}",
                    self.timeout
                );
                (ProviderStats::zero(provider), FetchOutcome::TimedOut)
            }
        };
        self.record(outcome, Some(started.elapsed()));
        stats
    }

    fn record(&self, outcome: FetchOutcome, elapsed: Option<Duration>) {
        if let Some(metrics) = &self.metrics {
            metrics.record(self.provider(), outcome, elapsed);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub leetcode_url: String,
    pub codeforces_url: String,
    pub github_url: String,
    pub github_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            leetcode_url: leetcode::DEFAULT_URL.to_string(),
            codeforces_url: codeforces::DEFAULT_URL.to_string(),
            github_url: github::DEFAULT_URL.to_string(),
            github_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProvidersConfig {
    /// Builds the adapters of all known providers.
    pub fn adapters(
        &self,
        metrics: Option<Arc<ProviderMetrics>>,
    ) -> anyhow::Result<Vec<ProviderAdapter>> {
        // octocrab and reqwest both pull rustls, the process needs a single provider
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;

        let adapters = vec![
            ProviderAdapter::new(
                leetcode::LeetCode::new(client.clone(), &self.leetcode_url),
                self.timeout,
            ),
            ProviderAdapter::new(
                codeforces::Codeforces::new(client, &self.codeforces_url),
                self.timeout,
            ),
            ProviderAdapter::new(
                github::Github::new(&self.github_url, self.github_token.clone())?,
                self.timeout,
            ),
        ];

        Ok(match metrics {
            Some(metrics) => adapters
                .into_iter()
                .map(|adapter| adapter.with_metrics(metrics.clone()))
                .collect(),
            None => adapters,
        })
    }
}
