use async_trait::async_trait;
use octocrab::{service::middleware::retry::RetryConfig, Octocrab};
use serde::Deserialize;
use tracing::instrument;

use super::StatsSource;
use crate::{GithubStats, Provider, ProviderStats};

pub const DEFAULT_URL: &str = "https://api.github.com";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserProfile {
    public_repos: Option<u32>,
    followers: Option<u32>,
}

impl From<UserProfile> for GithubStats {
    fn from(profile: UserProfile) -> Self {
        Self {
            public_repos: profile.public_repos.unwrap_or_default(),
            followers: profile.followers.unwrap_or_default(),
        }
    }
}

pub struct Github {
    octocrab: Octocrab,
}

impl Github {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        // A failed lookup must cost the provider a single request
        let mut builder = Octocrab::builder()
            .base_uri(base_url)?
            .add_retry_config(RetryConfig::None);
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        Ok(Self {
            octocrab: builder.build()?,
        })
    }
}

fn user_route(handle: &str) -> anyhow::Result<String> {
    let mut url = reqwest::Url::parse("http://localhost/users")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Failed to build route for {handle}"))?
        .push(handle);
    Ok(url.path().to_string())
}

#[async_trait]
impl StatsSource for Github {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    #[instrument(skip(self))]
    async fn fetch(&self, handle: &str) -> anyhow::Result<ProviderStats> {
        // The typed octocrab profile requires every field, we only need two of them
        let profile: UserProfile = self
            .octocrab
            .get(user_route(handle)?, None::<&()>)
            .await?;
        Ok(ProviderStats::Github(profile.into()))
    }
}
