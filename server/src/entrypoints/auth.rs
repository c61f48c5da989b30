use aura_server::{
    auth::AuthConfig,
    db::DB,
    error::{ApiError, ApiResult},
    types::{non_blank, AuthResponse, LoginRequest, RegisterRequest},
};
use rocket::{fairing::AdHoc, http::Status, response::status::Custom, serde::json::Json, State};
use tracing::instrument;

#[utoipa::path(context_path = "/api/auth", request_body = RegisterRequest, responses(
    (status = 201, description = "Account created", body = AuthResponse),
    (status = 400, description = "Missing fields or account already exists")
))]
#[post("/register", data = "<request>")]
#[instrument(skip(request, db, auth))]
pub async fn register(
    request: Json<RegisterRequest>,
    db: &State<DB>,
    auth: &State<AuthConfig>,
) -> ApiResult<Custom<Json<AuthResponse>>> {
    let (Some(username), Some(email), Some(password)) = (
        non_blank(request.username.as_deref()),
        non_blank(request.email.as_deref()),
        request.password.as_deref().filter(|p| !p.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Username, email and password are required",
        ));
    };
    let email = email.to_lowercase();

    let password_hash = auth
        .hash_password(password)
        .await
        .map_err(|e| ApiError::internal("Failed to hash password", e))?;

    let user = db
        .create_user(username, &email, &password_hash)
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to register {username}"), e))?
        .ok_or_else(|| ApiError::bad_request("User with that email or username already exists"))?;

    let token = auth
        .issue_token(&user)
        .map_err(|e| ApiError::internal("Failed to issue token", e))?;
    rocket::info!("Registered user {}", user.username);

    Ok(Custom(
        Status::Created,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(context_path = "/api/auth", request_body = LoginRequest, responses(
    (status = 200, description = "Logged in", body = AuthResponse),
    (status = 400, description = "Missing fields or invalid credentials")
))]
#[post("/login", data = "<request>")]
#[instrument(skip(request, db, auth))]
pub async fn login(
    request: Json<LoginRequest>,
    db: &State<DB>,
    auth: &State<AuthConfig>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (
        non_blank(request.email.as_deref()),
        request.password.as_deref().filter(|p| !p.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    let email = email.to_lowercase();
    let invalid = || ApiError::bad_request("Invalid credentials");

    let credentials = db
        .get_credentials(&email)
        .await
        .map_err(|e| ApiError::internal("Failed to load credentials", e))?
        .ok_or_else(invalid)?;

    let matches = auth
        .verify_password(password, &credentials.password_hash)
        .await
        .map_err(|e| ApiError::internal("Failed to verify password", e))?;
    if !matches {
        return Err(invalid());
    }

    let user = db
        .get_user_by_id(credentials.id)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?
        .ok_or_else(invalid)?;
    let token = auth
        .issue_token(&user)
        .map_err(|e| ApiError::internal("Failed to issue token", e))?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing auth entrypoints", |rocket| async {
        rocket.mount("/api/auth", routes![register, login])
    })
}
