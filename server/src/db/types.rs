use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shared::{
    AuraStats, CodeforcesStats, DifficultyBreakdown, GithubStats, LeetCodeStats, ProviderHandles,
};

/// Counters are `INTEGER` columns, larger upstream values are stored as `i32::MAX`.
pub fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn from_column(value: i32) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

/// A user row without the password hash.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub profile_picture: String,
    pub leetcode_handle: String,
    pub codeforces_handle: String,
    pub github_handle: String,
    pub aura_points: i64,
    pub rank_title: String,
    pub leetcode_easy: i32,
    pub leetcode_medium: i32,
    pub leetcode_hard: i32,
    pub leetcode_ranking: i32,
    pub codeforces_rating: i32,
    pub codeforces_max_rating: i32,
    pub codeforces_rank: String,
    pub github_public_repos: i32,
    pub github_followers: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl UserRecord {
    /// A freshly registered account: zero score, zeroed breakdown, no handles.
    pub fn newcomer(id: i32, username: String, email: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            username,
            email,
            full_name: String::new(),
            bio: String::new(),
            profile_picture: String::new(),
            leetcode_handle: String::new(),
            codeforces_handle: String::new(),
            github_handle: String::new(),
            aura_points: 0,
            rank_title: "Novice".to_string(),
            leetcode_easy: 0,
            leetcode_medium: 0,
            leetcode_hard: 0,
            leetcode_ranking: 0,
            codeforces_rating: 0,
            codeforces_max_rating: 0,
            codeforces_rank: String::new(),
            github_public_repos: 0,
            github_followers: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn handles(&self) -> ProviderHandles {
        ProviderHandles {
            leetcode: self.leetcode_handle.clone(),
            codeforces: self.codeforces_handle.clone(),
            github: self.github_handle.clone(),
        }
    }

    pub fn stats(&self) -> AuraStats {
        let breakdown = DifficultyBreakdown {
            easy: from_column(self.leetcode_easy),
            medium: from_column(self.leetcode_medium),
            hard: from_column(self.leetcode_hard),
        };
        AuraStats {
            leetcode: LeetCodeStats {
                total_solved: breakdown
                    .easy
                    .saturating_add(breakdown.medium)
                    .saturating_add(breakdown.hard),
                ranking: from_column(self.leetcode_ranking),
                breakdown,
            },
            codeforces: CodeforcesStats {
                rating: self.codeforces_rating,
                max_rating: self.codeforces_max_rating,
                rank: self.codeforces_rank.clone(),
            },
            github: GithubStats {
                public_repos: from_column(self.github_public_repos),
                followers: from_column(self.github_followers),
            },
        }
    }

    /// Overwrites every reputation column at once.
    pub fn apply(&mut self, fields: &ReputationFields) {
        let stats = &fields.stats;
        self.aura_points = fields.aura_points;
        self.leetcode_easy = to_column(stats.leetcode.breakdown.easy);
        self.leetcode_medium = to_column(stats.leetcode.breakdown.medium);
        self.leetcode_hard = to_column(stats.leetcode.breakdown.hard);
        self.leetcode_ranking = to_column(stats.leetcode.ranking);
        self.codeforces_rating = stats.codeforces.rating;
        self.codeforces_max_rating = stats.codeforces.max_rating;
        self.codeforces_rank = stats.codeforces.rank.clone();
        self.github_public_repos = to_column(stats.github.public_repos);
        self.github_followers = to_column(stats.github.followers);
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// Everything a refresh writes, applied as a single update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReputationFields {
    pub aura_points: i64,
    pub stats: AuraStats,
}

impl From<AuraStats> for ReputationFields {
    fn from(stats: AuraStats) -> Self {
        Self {
            aura_points: stats.aura() as i64,
            stats,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub password_hash: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardRecord {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub profile_picture: String,
    pub aura_points: i64,
    pub rank_title: String,
}

impl From<&UserRecord> for LeaderboardRecord {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            profile_picture: user.profile_picture.clone(),
            aura_points: user.aura_points,
            rank_title: user.rank_title.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub full_name: Option<String>,
    pub leetcode_handle: Option<String>,
    pub codeforces_handle: Option<String>,
    pub github_handle: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub author_id: i32,
    pub author_username: String,
    pub author_full_name: String,
    pub author_profile_picture: String,
    pub author_rank_title: String,
    pub likes: Vec<i32>,
}
