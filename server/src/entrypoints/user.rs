use std::sync::Arc;

use aura_server::{
    aura::AuraEngine,
    db::DB,
    error::{ApiError, ApiResult},
    prometheus::{PrometheusClient, RefreshOutcome},
    types::{ProfileUpdateRequest, UserProfile},
};
use rocket::{fairing::AdHoc, serde::json::Json, State};

#[utoipa::path(context_path = "/api/users", responses(
    (status = 200, description = "Get user profile", body = UserProfile),
    (status = 404, description = "User not found")
))]
#[get("/<username>")]
pub async fn get_user(username: &str, db: &State<DB>) -> ApiResult<Json<UserProfile>> {
    match db.get_user(username).await {
        Ok(Some(user)) => Ok(Json(user.into())),
        Ok(None) => Err(ApiError::not_found("User not found")),
        Err(e) => Err(ApiError::internal(&format!("Failed to get user {username}"), e)),
    }
}

#[utoipa::path(context_path = "/api/users", request_body = ProfileUpdateRequest, responses(
    (status = 200, description = "Updated user profile", body = UserProfile),
    (status = 404, description = "User not found")
))]
#[put("/<username>", data = "<update>")]
pub async fn update_user(
    username: &str,
    update: Json<ProfileUpdateRequest>,
    db: &State<DB>,
) -> ApiResult<Json<UserProfile>> {
    match db.update_profile(username, &update.into_inner().into()).await {
        Ok(Some(user)) => Ok(Json(user.into())),
        Ok(None) => Err(ApiError::not_found("User not found")),
        Err(e) => Err(ApiError::internal(
            &format!("Failed to update profile of {username}"),
            e,
        )),
    }
}

async fn refresh(
    username: &str,
    engine: &AuraEngine,
    prometheus: &PrometheusClient,
) -> ApiResult<Json<UserProfile>> {
    match engine.refresh(username).await {
        Ok(Some(user)) => {
            prometheus.record_refresh(RefreshOutcome::Updated);
            Ok(Json(user.into()))
        }
        Ok(None) => {
            prometheus.record_refresh(RefreshOutcome::NotFound);
            Err(ApiError::not_found("User not found"))
        }
        Err(e) => {
            prometheus.record_refresh(RefreshOutcome::Failed);
            Err(ApiError::internal(
                &format!("Failed to refresh aura of {username}"),
                e,
            ))
        }
    }
}

#[utoipa::path(context_path = "/api/users", responses(
    (status = 200, description = "Recomputed user aura", body = UserProfile),
    (status = 404, description = "User not found")
))]
#[post("/<username>/refresh")]
pub async fn refresh_user(
    username: &str,
    engine: &State<AuraEngine>,
    prometheus: &State<Arc<PrometheusClient>>,
) -> ApiResult<Json<UserProfile>> {
    refresh(username, engine, prometheus).await
}

#[utoipa::path(context_path = "/api/refresh", responses(
    (status = 200, description = "Recomputed user aura", body = UserProfile),
    (status = 404, description = "User not found")
))]
#[post("/<username>")]
pub async fn refresh_alias(
    username: &str,
    engine: &State<AuraEngine>,
    prometheus: &State<Arc<PrometheusClient>>,
) -> ApiResult<Json<UserProfile>> {
    refresh(username, engine, prometheus).await
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing user entrypoints", |rocket| async {
        rocket
            .mount("/api/users", routes![get_user, update_user, refresh_user])
            .mount("/api/refresh", routes![refresh_alias])
    })
}
