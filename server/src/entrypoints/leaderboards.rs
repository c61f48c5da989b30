use aura_server::{
    aura::AuraEngine,
    error::{ApiError, ApiResult},
    types::LeaderboardEntry,
};
use rocket::{fairing::AdHoc, serde::json::Json, State};

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;

#[utoipa::path(context_path = "/api/users", responses(
    (status = 200, description = "Top users by aura", body = [LeaderboardEntry])
))]
#[get("/leaderboard?<limit>")]
pub async fn get_leaderboard(
    limit: Option<u32>,
    engine: &State<AuraEngine>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let records = engine
        .store()
        .list_top_by_score(limit as i64)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch leaderboard", e))?;

    Ok(Json(LeaderboardEntry::ranked(records)))
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing leaderboard entrypoints", |rocket| async {
        rocket.mount("/api/users", routes![get_leaderboard])
    })
}
