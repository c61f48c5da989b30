use std::sync::Arc;

use futures::future::join_all;
use rocket::fairing::AdHoc;
use rocket_db_pools::Database;
use shared::{providers::ProviderAdapter, providers::ProvidersConfig, AuraStats};
use tracing::{info, instrument};

use crate::{
    db::{
        types::{ReputationFields, UserRecord},
        DB,
    },
    prometheus::PrometheusClient,
    store::ReputationStore,
};

/// Recomputes an account's aura from live provider data.
pub struct AuraEngine {
    adapters: Vec<ProviderAdapter>,
    store: Arc<dyn ReputationStore>,
}

impl AuraEngine {
    pub fn new(adapters: Vec<ProviderAdapter>, store: Arc<dyn ReputationStore>) -> Self {
        Self { adapters, store }
    }

    pub fn store(&self) -> &Arc<dyn ReputationStore> {
        &self.store
    }

    /// Collects stats from every provider concurrently and stores the new score.
    ///
    /// `Ok(None)` means the account doesn't exist, nothing is written then.
    /// Provider failures never surface here, they only zero that provider's part.
    #[instrument(skip(self))]
    pub async fn refresh(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        let Some(user) = self.store.find_by_username(username).await? else {
            return Ok(None);
        };

        let handles = user.handles();
        let stats: AuraStats = join_all(self.adapters.iter().map(|adapter| {
            adapter.fetch_stats(handles.effective(adapter.provider(), &user.username))
        }))
        .await
        .into_iter()
        .collect();

        let fields = ReputationFields::from(stats);
        info!(
            "Refreshed aura of {}: {} -> {}",
            user.username, user.aura_points, fields.aura_points
        );

        self.store
            .set_reputation_fields(&user.username, &fields)
            .await
    }
}

pub fn stage(config: ProvidersConfig, prometheus: Arc<PrometheusClient>) -> AdHoc {
    AdHoc::on_ignite("Aura engine", move |rocket| async move {
        // The pool only exists once the SQLx stage ignited, so build the engine after it
        rocket.attach(AdHoc::try_on_ignite(
            "Aura engine store",
            move |rocket| async move {
                let Some(db) = DB::fetch(&rocket).cloned() else {
                    rocket::error!("Aura engine requires the database to be attached");
                    return Err(rocket);
                };
                let adapters = match config.adapters(Some(prometheus.provider_metrics())) {
                    Ok(adapters) => adapters,
                    Err(e) => {
                        rocket::error!("Failed to create provider clients: {e:#}");
                        return Err(rocket);
                    }
                };

                Ok(rocket.manage(AuraEngine::new(adapters, Arc::new(db))))
            },
        ))
    })
}
