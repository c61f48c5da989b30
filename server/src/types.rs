use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shared::{AuraStats, ProviderHandles};
use utoipa::ToSchema;

use crate::db::types::{LeaderboardRecord, PostRecord, ProfileUpdate, UserRecord};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub profile_picture: String,
    #[schema(value_type = Object)]
    pub handles: ProviderHandles,
    pub aura_points: i64,
    pub rank_title: String,
    #[schema(value_type = Object)]
    pub stats: AuraStats,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            handles: record.handles(),
            stats: record.stats(),
            id: record.id,
            username: record.username,
            email: record.email,
            full_name: record.full_name,
            bio: record.bio,
            profile_picture: record.profile_picture,
            aura_points: record.aura_points,
            rank_title: record.rank_title,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub place: u32,
    pub username: String,
    pub full_name: String,
    pub profile_picture: String,
    pub aura_points: i64,
    pub rank_title: String,
}

impl LeaderboardEntry {
    /// Numbers the records from 1 in the order given.
    pub fn ranked(records: Vec<LeaderboardRecord>) -> Vec<Self> {
        records
            .into_iter()
            .zip(1..)
            .map(|(record, place)| Self {
                place,
                username: record.username,
                full_name: record.full_name,
                profile_picture: record.profile_picture,
                aura_points: record.aura_points,
                rank_title: record.rank_title,
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorSummary {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub profile_picture: String,
    pub rank_title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub author: AuthorSummary,
    pub likes: Vec<i32>,
    pub like_count: usize,
}

impl From<PostRecord> for PostResponse {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            content: record.content,
            created_at: record.created_at,
            author: AuthorSummary {
                id: record.author_id,
                username: record.author_username,
                full_name: record.author_full_name,
                profile_picture: record.author_profile_picture,
                rank_title: record.author_rank_title,
            },
            like_count: record.likes.len(),
            likes: record.likes,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProfileUpdateRequest {
    pub bio: Option<String>,
    pub full_name: Option<String>,
    pub leetcode_handle: Option<String>,
    pub codeforces_handle: Option<String>,
    pub github_handle: Option<String>,
}

impl From<ProfileUpdateRequest> for ProfileUpdate {
    fn from(request: ProfileUpdateRequest) -> Self {
        let trim = |handle: Option<String>| handle.map(|h| h.trim().to_string());
        Self {
            bio: request.bio,
            full_name: request.full_name,
            leetcode_handle: trim(request.leetcode_handle),
            codeforces_handle: trim(request.codeforces_handle),
            github_handle: trim(request.github_handle),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewPostRequest {
    pub content: Option<String>,
}

/// Returns the trimmed value, or `None` when it is missing or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
