use std::sync::Arc;

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use shared::providers::ProviderMetrics;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum RefreshOutcome {
    Updated,
    NotFound,
    Failed,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RefreshRecord {
    pub outcome: RefreshOutcome,
}

pub struct PrometheusClient {
    registry: Registry,
    providers: Arc<ProviderMetrics>,
    refresh: Family<RefreshRecord, Counter>,
}

impl Default for PrometheusClient {
    fn default() -> Self {
        let mut registry = Registry::default();
        let providers = Arc::new(ProviderMetrics::default());
        let refresh = Family::default();

        providers.register(&mut registry);
        registry.register("aura_refresh", "Aura refresh requests", refresh.clone());

        Self {
            registry,
            providers,
            refresh,
        }
    }
}

impl PrometheusClient {
    pub fn provider_metrics(&self) -> Arc<ProviderMetrics> {
        self.providers.clone()
    }

    pub fn record_refresh(&self, outcome: RefreshOutcome) {
        self.refresh.get_or_create(&RefreshRecord { outcome }).inc();
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use shared::{providers::FetchOutcome, Provider};

    use super::*;

    #[test]
    fn encodes_provider_and_refresh_metrics() {
        let prometheus = PrometheusClient::default();
        prometheus.record_refresh(RefreshOutcome::Updated);
        prometheus
            .provider_metrics()
            .record(Provider::Github, FetchOutcome::TimedOut, None);

        let body = prometheus.encode().unwrap();
        assert!(body.contains(r#"aura_refresh_total{outcome="Updated"} 1"#));
        assert!(body.contains(r#"provider_fetch_total{provider="github",outcome="TimedOut"} 1"#));
    }
}
