use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::StatsSource;
use crate::{DifficultyBreakdown, LeetCodeStats, Provider, ProviderStats};

pub const DEFAULT_URL: &str = "https://leetcode.com/graphql";

const PROFILE_QUERY: &str = r#"
query userProfile($username: String!) {
  matchedUser(username: $username) {
    profile {
      ranking
    }
    submitStats: submitStatsGlobal {
      acSubmissionNum {
        difficulty
        count
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ProfileData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileData {
    matched_user: Option<MatchedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUser {
    profile: Option<Profile>,
    submit_stats: Option<SubmitStats>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    ranking: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitStats {
    #[serde(default)]
    ac_submission_num: Vec<AcceptedCount>,
}

#[derive(Debug, Deserialize)]
struct AcceptedCount {
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    count: Option<u32>,
}

impl From<MatchedUser> for LeetCodeStats {
    fn from(user: MatchedUser) -> Self {
        let mut breakdown = DifficultyBreakdown::default();
        let accepted = user
            .submit_stats
            .map(|stats| stats.ac_submission_num)
            .unwrap_or_default();
        // The API also reports an "All" bucket holding the sum, it is not a difficulty
        for entry in accepted {
            let count = entry.count.unwrap_or_default();
            match entry.difficulty.as_str() {
                "Easy" => breakdown.easy = count,
                "Medium" => breakdown.medium = count,
                "Hard" => breakdown.hard = count,
                _ => {}
            }
        }

        Self {
            total_solved: breakdown
                .easy
                .saturating_add(breakdown.medium)
                .saturating_add(breakdown.hard),
            ranking: user
                .profile
                .and_then(|profile| profile.ranking)
                .unwrap_or_default(),
            breakdown,
        }
    }
}

pub struct LeetCode {
    client: reqwest::Client,
    url: String,
}

impl LeetCode {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl StatsSource for LeetCode {
    fn provider(&self) -> Provider {
        Provider::LeetCode
    }

    #[instrument(skip(self))]
    async fn fetch(&self, handle: &str) -> anyhow::Result<ProviderStats> {
        let response: GraphqlResponse = self
            .client
            .post(&self.url)
            .json(&json!({
                "query": PROFILE_QUERY,
                "variables": { "username": handle },
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let user = response
            .data
            .and_then(|data| data.matched_user)
            .ok_or_else(|| anyhow::anyhow!("No LeetCode user matched {handle}"))?;

        Ok(ProviderStats::LeetCode(user.into()))
    }
}
