use std::time::Duration;

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

use crate::Provider;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum FetchOutcome {
    Ok,
    Skipped,
    Failed,
    TimedOut,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FetchRecord {
    pub provider: String,
    pub outcome: FetchOutcome,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProviderLabel {
    pub provider: String,
}

pub struct ProviderMetrics {
    fetch: Family<FetchRecord, Counter>,
    fetch_time: Family<ProviderLabel, Histogram>,
}

impl Default for ProviderMetrics {
    fn default() -> Self {
        let fetch_time: Family<ProviderLabel, Histogram> = Family::new_with_constructor(|| {
            Histogram::new([0.1, 0.25, 0.5, 1., 2., 4., 8.].into_iter())
        });
        Self {
            fetch: Family::default(),
            fetch_time,
        }
    }
}

impl ProviderMetrics {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "provider_fetch",
            "Provider stats lookups by outcome",
            self.fetch.clone(),
        );
        registry.register(
            "provider_fetch_seconds",
            "Time spent waiting for provider responses",
            self.fetch_time.clone(),
        );
    }

    pub fn record(&self, provider: Provider, outcome: FetchOutcome, elapsed: Option<Duration>) {
        self.fetch
            .get_or_create(&FetchRecord {
                provider: provider.to_string(),
                outcome,
            })
            .inc();

        if let Some(elapsed) = elapsed {
            self.fetch_time
                .get_or_create(&ProviderLabel {
                    provider: provider.to_string(),
                })
                .observe(elapsed.as_secs_f64());
        }
    }

    pub fn count(&self, provider: Provider, outcome: FetchOutcome) -> u64 {
        self.fetch
            .get_or_create(&FetchRecord {
                provider: provider.to_string(),
                outcome,
            })
            .get()
    }
}
