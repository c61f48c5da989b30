use std::sync::Arc;

use aura_server::{
    error::ApiError,
    prometheus::PrometheusClient,
    types::{
        AuthResponse, AuthorSummary, HealthResponse, LeaderboardEntry, LoginRequest,
        NewPostRequest, PostResponse, ProfileUpdateRequest, RegisterRequest, UserProfile,
    },
};
use rocket::{fairing::AdHoc, http::ContentType, serde::json::Json, Request, State};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod leaderboards;
pub mod posts;
pub mod user;

#[derive(OpenApi)]
#[openapi(
    info(title = "Aura API", description = "Developer reputation across coding platforms"),
    paths(
        health,
        auth::register,
        auth::login,
        leaderboards::get_leaderboard,
        user::get_user,
        user::update_user,
        user::refresh_user,
        user::refresh_alias,
        posts::create_post,
        posts::get_posts,
        posts::toggle_like,
    ),
    components(schemas(
        HealthResponse,
        UserProfile,
        LeaderboardEntry,
        AuthResponse,
        AuthorSummary,
        PostResponse,
        RegisterRequest,
        LoginRequest,
        ProfileUpdateRequest,
        NewPostRequest,
    ))
)]
struct ApiDoc;

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Service is up", body = HealthResponse)
))]
#[get("/health")]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Aura API is running".to_string(),
    })
}

#[get("/metrics")]
async fn metrics(prometheus: &State<Arc<PrometheusClient>>) -> Result<(ContentType, String), ApiError> {
    let body = prometheus
        .encode()
        .map_err(|e| ApiError::internal("Failed to encode metrics", e))?;
    Ok((ContentType::Plain, body))
}

#[catch(default)]
fn default_catcher(status: rocket::http::Status, _req: &Request<'_>) -> ApiError {
    let message = status.reason().unwrap_or("Unknown error");
    ApiError::new(status, message)
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .mount("/api", routes![health])
            .mount("/", routes![metrics])
            .mount(
                "/",
                SwaggerUi::new("/swagger-ui/<_..>").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .register("/", catchers![default_catcher])
            .attach(auth::stage())
            .attach(user::stage())
            .attach(leaderboards::stage())
            .attach(posts::stage())
    })
}
