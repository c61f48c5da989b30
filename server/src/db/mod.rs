use rocket::{
    fairing::{self, AdHoc},
    Build, Rocket,
};
use rocket_db_pools::Database;
use sqlx::PgPool;
use tracing::instrument;

#[derive(Database, Clone, Debug)]
#[database("aura")]
pub struct DB(PgPool);

pub mod types;

use self::types::{
    to_column, LeaderboardRecord, PostRecord, ProfileUpdate, ReputationFields, UserCredentials,
    UserRecord,
};

const USER_COLUMNS: &str = r#"
    id, username, email, full_name, bio, profile_picture,
    leetcode_handle, codeforces_handle, github_handle,
    aura_points, rank_title,
    leetcode_easy, leetcode_medium, leetcode_hard, leetcode_ranking,
    codeforces_rating, codeforces_max_rating, codeforces_rank,
    github_public_repos, github_followers,
    created_at, updated_at
"#;

impl DB {
    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: i32) -> anyhow::Result<Option<UserRecord>> {
        Ok(sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_credentials(&self, email: &str) -> anyhow::Result<Option<UserCredentials>> {
        Ok(sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.0)
        .await?)
    }

    /// Returns `None` when the username or email is already taken.
    #[instrument(skip(self, password_hash))]
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRecord>> {
        Ok(sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<UserRecord>> {
        Ok(
            sqlx::query_as::<_, UserRecord>(include_str!("../../sql/update_profile.sql"))
                .bind(username)
                .bind(&update.bio)
                .bind(&update.full_name)
                .bind(&update.leetcode_handle)
                .bind(&update.codeforces_handle)
                .bind(&update.github_handle)
                .fetch_optional(&self.0)
                .await?,
        )
    }

    /// Single statement, so readers see either all old or all new reputation columns.
    #[instrument(skip(self))]
    pub async fn set_reputation_fields(
        &self,
        username: &str,
        fields: &ReputationFields,
    ) -> anyhow::Result<Option<UserRecord>> {
        let stats = &fields.stats;
        Ok(
            sqlx::query_as::<_, UserRecord>(include_str!("../../sql/set_reputation_fields.sql"))
                .bind(username)
                .bind(fields.aura_points)
                .bind(to_column(stats.leetcode.breakdown.easy))
                .bind(to_column(stats.leetcode.breakdown.medium))
                .bind(to_column(stats.leetcode.breakdown.hard))
                .bind(to_column(stats.leetcode.ranking))
                .bind(stats.codeforces.rating)
                .bind(stats.codeforces.max_rating)
                .bind(&stats.codeforces.rank)
                .bind(to_column(stats.github.public_repos))
                .bind(to_column(stats.github.followers))
                .fetch_optional(&self.0)
                .await?,
        )
    }

    #[instrument(skip(self))]
    pub async fn get_leaderboard(&self, limit: i64) -> anyhow::Result<Vec<LeaderboardRecord>> {
        Ok(sqlx::query_as::<_, LeaderboardRecord>(
            r#"
            SELECT id, username, full_name, profile_picture, aura_points, rank_title
            FROM users
            ORDER BY aura_points DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.0)
        .await?)
    }

    #[instrument(skip(self, content))]
    pub async fn create_post(&self, author_id: i32, content: &str) -> anyhow::Result<PostRecord> {
        let (id,): (i32,) =
            sqlx::query_as("INSERT INTO posts (author_id, content) VALUES ($1, $2) RETURNING id")
                .bind(author_id)
                .bind(content)
                .fetch_one(&self.0)
                .await?;

        self.get_post(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post {id} vanished right after creation"))
    }

    #[instrument(skip(self))]
    pub async fn get_posts(&self) -> anyhow::Result<Vec<PostRecord>> {
        Ok(
            sqlx::query_as::<_, PostRecord>(include_str!("../../sql/get_posts.sql"))
                .bind(None::<i32>)
                .fetch_all(&self.0)
                .await?,
        )
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, id: i32) -> anyhow::Result<Option<PostRecord>> {
        Ok(
            sqlx::query_as::<_, PostRecord>(include_str!("../../sql/get_posts.sql"))
                .bind(Some(id))
                .fetch_optional(&self.0)
                .await?,
        )
    }

    /// Likes the post if `user_id` hasn't yet, unlikes it otherwise.
    /// Returns `None` for an unknown post.
    #[instrument(skip(self))]
    pub async fn toggle_like(&self, post_id: i32, user_id: i32) -> anyhow::Result<Option<PostRecord>> {
        let mut tx = self.0.begin().await?;

        let post: Option<(i32,)> = sqlx::query_as("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(tx.as_mut())
            .await?;
        if post.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(tx.as_mut())
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query(
                r#"
                INSERT INTO post_likes (post_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (post_id, user_id) DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(user_id)
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;
        self.get_post(post_id).await
    }
}

async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    match DB::fetch(&rocket) {
        Some(db) => match sqlx::migrate!("./migrations").run(&**db).await {
            Ok(_) => Ok(rocket),
            Err(e) => {
                rocket::error!("Failed to initialize SQLx database: {}", e);
                Err(rocket)
            }
        },
        None => Err(rocket),
    }
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket
            .attach(DB::init())
            .attach(AdHoc::try_on_ignite("SQLx Migrations", run_migrations))
    })
}
