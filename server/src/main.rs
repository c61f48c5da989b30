#[macro_use]
extern crate rocket;

mod entrypoints;

use std::sync::Arc;
use std::time::Duration;

use rocket_cors::CorsOptions;
use shared::providers::ProvidersConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use aura_server::{
    aura,
    auth::{self, AuthConfig},
    db,
    prometheus::PrometheusClient,
};

#[derive(Debug, serde::Deserialize)]
pub struct Env {
    jwt_secret: String,
    github_token: Option<String>,
    provider_timeout_secs: Option<u64>,
    leetcode_url: Option<String>,
    codeforces_url: Option<String>,
    github_url: Option<String>,
}

impl Env {
    fn providers(&self) -> ProvidersConfig {
        let defaults = ProvidersConfig::default();
        ProvidersConfig {
            leetcode_url: self.leetcode_url.clone().unwrap_or(defaults.leetcode_url),
            codeforces_url: self
                .codeforces_url
                .clone()
                .unwrap_or(defaults.codeforces_url),
            github_url: self.github_url.clone().unwrap_or(defaults.github_url),
            github_token: self.github_token.clone(),
            timeout: self
                .provider_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let env = envy::from_env::<Env>().expect("Failed to load environment variables");
    let prometheus = Arc::new(PrometheusClient::default());
    let cors = CorsOptions::default()
        .to_cors()
        .expect("Failed to create CORS fairing");

    let span = tracing::info_span!("Starting Rocket");
    let _enter = span.enter();

    rocket::build()
        .manage(prometheus.clone())
        .attach(cors)
        .attach(db::stage())
        .attach(auth::stage(AuthConfig::new(env.jwt_secret.clone())))
        .attach(aura::stage(env.providers(), prometheus))
        .attach(entrypoints::stage())
}
