use std::collections::BTreeMap;

use async_trait::async_trait;
use rocket::tokio::sync::RwLock;

use crate::db::{
    types::{LeaderboardRecord, ReputationFields, UserRecord},
    DB,
};

/// Persistence the aggregation engine and the leaderboard depend on.
#[async_trait]
pub trait ReputationStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Replaces score and breakdown of one account in a single atomic write.
    async fn set_reputation_fields(
        &self,
        username: &str,
        fields: &ReputationFields,
    ) -> anyhow::Result<Option<UserRecord>>;

    /// Highest score first, ties ordered by account id.
    async fn list_top_by_score(&self, limit: i64) -> anyhow::Result<Vec<LeaderboardRecord>>;
}

#[async_trait]
impl ReputationStore for DB {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        self.get_user(username).await
    }

    async fn set_reputation_fields(
        &self,
        username: &str,
        fields: &ReputationFields,
    ) -> anyhow::Result<Option<UserRecord>> {
        DB::set_reputation_fields(self, username, fields).await
    }

    async fn list_top_by_score(&self, limit: i64) -> anyhow::Result<Vec<LeaderboardRecord>> {
        self.get_leaderboard(limit).await
    }
}

/// In-process store keyed by account id, used for tests and local runs without Postgres.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<i32, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn remove(&self, username: &str) -> Option<UserRecord> {
        let mut users = self.users.write().await;
        let id = users.values().find(|u| u.username == username)?.id;
        users.remove(&id)
    }

    pub async fn snapshot(&self) -> Vec<UserRecord> {
        self.users.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ReputationStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn set_reputation_fields(
        &self,
        username: &str,
        fields: &ReputationFields,
    ) -> anyhow::Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        let Some(user) = users.values_mut().find(|u| u.username == username) else {
            return Ok(None);
        };
        user.apply(fields);
        Ok(Some(user.clone()))
    }

    async fn list_top_by_score(&self, limit: i64) -> anyhow::Result<Vec<LeaderboardRecord>> {
        let users = self.users.read().await;
        let mut records: Vec<LeaderboardRecord> = users.values().map(Into::into).collect();
        // BTreeMap iterates by id, the stable sort keeps that order among equal scores
        records.sort_by(|a, b| b.aura_points.cmp(&a.aura_points));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared::{AuraStats, CodeforcesStats, GithubStats};

    use super::*;

    fn user(id: i32, name: &str, aura_points: i64) -> UserRecord {
        let mut user = UserRecord::newcomer(id, name.to_string(), format!("{name}@example.com"));
        user.aura_points = aura_points;
        user
    }

    #[tokio::test]
    async fn leaderboard_orders_by_score_then_id() {
        let store = MemoryStore::new();
        store.insert(user(3, "carol", 100)).await;
        store.insert(user(1, "alice", 100)).await;
        store.insert(user(2, "bob", 4900)).await;
        store.insert(user(4, "dave", 0)).await;

        let top = store.list_top_by_score(3).await.unwrap();
        let names: Vec<_> = top.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice", "carol"]);

        assert!(store.list_top_by_score(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_fields_on_missing_user() {
        let store = MemoryStore::new();
        store.insert(user(1, "alice", 0)).await;
        let before = store.snapshot().await;

        let result = store
            .set_reputation_fields("nobody", &ReputationFields::default())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.snapshot().await, before);
    }

    fn fields(rating: i32, repos: u32) -> ReputationFields {
        AuraStats {
            codeforces: CodeforcesStats {
                rating,
                max_rating: rating,
                rank: format!("rank-{rating}"),
            },
            github: GithubStats {
                public_repos: repos,
                followers: repos,
            },
            ..Default::default()
        }
        .into()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_partial_writes() {
        let store = Arc::new(MemoryStore::new());
        store.insert(user(1, "alice", 0)).await;
        store
            .set_reputation_fields("alice", &fields(0, 0))
            .await
            .unwrap();

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                rocket::tokio::spawn(async move {
                    for round in 0..50 {
                        let value = (i * 100 + round) as i32;
                        store
                            .set_reputation_fields("alice", &fields(value, value as u32))
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            rocket::tokio::spawn(async move {
                for _ in 0..500 {
                    let user = store.find_by_username("alice").await.unwrap().unwrap();
                    assert_eq!(user.aura_points as u64, user.stats().aura());
                    assert_eq!(user.codeforces_rating, user.github_public_repos);
                    assert_eq!(user.codeforces_rank, format!("rank-{}", user.codeforces_rating));
                    rocket::tokio::task::yield_now().await;
                }
            })
        };

        for writer in writers {
            writer.await.unwrap();
        }
        reader.await.unwrap();
    }
}
