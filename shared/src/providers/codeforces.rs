use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use super::StatsSource;
use crate::{CodeforcesStats, Provider, ProviderStats};

pub const DEFAULT_URL: &str = "https://codeforces.com/api";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    comment: Option<String>,
    #[serde(default)]
    result: Vec<UserInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    #[serde(default)]
    rating: Option<i32>,
    #[serde(default)]
    max_rating: Option<i32>,
    #[serde(default)]
    rank: Option<String>,
}

impl From<UserInfo> for CodeforcesStats {
    fn from(user: UserInfo) -> Self {
        Self {
            rating: user.rating.unwrap_or_default(),
            max_rating: user.max_rating.unwrap_or_default(),
            rank: user.rank.unwrap_or_default(),
        }
    }
}

pub struct Codeforces {
    client: reqwest::Client,
    base_url: String,
}

impl Codeforces {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StatsSource for Codeforces {
    fn provider(&self) -> Provider {
        Provider::Codeforces
    }

    #[instrument(skip(self))]
    async fn fetch(&self, handle: &str) -> anyhow::Result<ProviderStats> {
        // Unknown handles come back as 400 with a FAILED body, both are lookup failures
        let response: ApiResponse = self
            .client
            .get(format!("{}/user.info", self.base_url))
            .query(&[("handles", handle)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "OK" {
            anyhow::bail!(
                "Codeforces returned {}: {}",
                response.status,
                response.comment.unwrap_or_default()
            );
        }

        let user = response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Codeforces returned no user for {handle}"))?;

        Ok(ProviderStats::Codeforces(user.into()))
    }
}
