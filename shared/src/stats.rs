use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

pub const LEETCODE_SOLVED_WEIGHT: i64 = 10;
pub const CODEFORCES_RATING_WEIGHT: i64 = 2;
pub const GITHUB_REPO_WEIGHT: i64 = 50;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    LeetCode,
    Codeforces,
    Github,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeetCodeStats {
    pub total_solved: u32,
    /// Global ranking, 0 when the profile is unranked.
    pub ranking: u32,
    pub breakdown: DifficultyBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeforcesStats {
    /// Current rating, 0 for unrated handles.
    pub rating: i32,
    pub max_rating: i32,
    /// Rank label such as "expert", empty for unranked handles.
    pub rank: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GithubStats {
    pub public_repos: u32,
    pub followers: u32,
}

/// Normalized statistics of a single provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderStats {
    LeetCode(LeetCodeStats),
    Codeforces(CodeforcesStats),
    Github(GithubStats),
}

impl ProviderStats {
    /// The "no data" value of a provider.
    pub fn zero(provider: Provider) -> Self {
        match provider {
            Provider::LeetCode => Self::LeetCode(Default::default()),
            Provider::Codeforces => Self::Codeforces(Default::default()),
            Provider::Github => Self::Github(Default::default()),
        }
    }

    pub const fn provider(&self) -> Provider {
        match self {
            Self::LeetCode(_) => Provider::LeetCode,
            Self::Codeforces(_) => Provider::Codeforces,
            Self::Github(_) => Provider::Github,
        }
    }
}

/// Merged statistics of all providers for one account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuraStats {
    pub leetcode: LeetCodeStats,
    pub codeforces: CodeforcesStats,
    pub github: GithubStats,
}

impl AuraStats {
    pub fn merge(&mut self, stats: ProviderStats) {
        match stats {
            ProviderStats::LeetCode(stats) => self.leetcode = stats,
            ProviderStats::Codeforces(stats) => self.codeforces = stats,
            ProviderStats::Github(stats) => self.github = stats,
        }
    }

    /// `solved * 10 + rating * 2 + public repos * 50`, floored at zero.
    pub fn aura(&self) -> u64 {
        let score = self.leetcode.total_solved as i64 * LEETCODE_SOLVED_WEIGHT
            + self.codeforces.rating as i64 * CODEFORCES_RATING_WEIGHT
            + self.github.public_repos as i64 * GITHUB_REPO_WEIGHT;
        score.max(0) as u64
    }
}

impl FromIterator<ProviderStats> for AuraStats {
    fn from_iter<T: IntoIterator<Item = ProviderStats>>(iter: T) -> Self {
        let mut result = Self::default();
        for stats in iter {
            result.merge(stats);
        }
        result
    }
}
