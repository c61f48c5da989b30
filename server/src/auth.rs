use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::{
    fairing::AdHoc,
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use rocket_db_pools::Database;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    db::{types::UserRecord, DB},
    error::ApiError,
};

pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    pub ttl: Duration,
    pub hash_cost: u32,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::days(TOKEN_TTL_DAYS),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn issue_token(&self, user: &UserRecord) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::Invalid)
    }

    pub async fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let password = password.to_owned();
        let cost = self.hash_cost;
        Ok(rocket::tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> anyhow::Result<bool> {
        let (password, hash) = (password.to_owned(), hash.to_owned());
        Ok(rocket::tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Missing,
    #[error("Invalid or expired token")]
    Invalid,
    #[error("User not found")]
    UnknownUser,
    #[error("Authentication is unavailable")]
    Internal,
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Internal => ApiError::new(Status::InternalServerError, error.to_string()),
            _ => ApiError::unauthorized(error.to_string()),
        }
    }
}

/// Accepts both `Bearer <token>` and a bare token.
pub fn extract_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// The account acting on the request, resolved from its session token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRecord);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(token) = req.headers().get_one("Authorization").and_then(extract_token) else {
            return Outcome::Error((Status::Unauthorized, AuthError::Missing));
        };
        let (Some(config), Some(db)) = (req.rocket().state::<AuthConfig>(), DB::fetch(req.rocket()))
        else {
            rocket::error!("Auth guard used without AuthConfig or database");
            return Outcome::Error((Status::InternalServerError, AuthError::Internal));
        };

        let claims = match config.verify_token(token) {
            Ok(claims) => claims,
            Err(e) => return Outcome::Error((Status::Unauthorized, e)),
        };

        match db.get_user_by_id(claims.sub).await {
            Ok(Some(user)) => Outcome::Success(AuthUser(user)),
            Ok(None) => Outcome::Error((Status::Unauthorized, AuthError::UnknownUser)),
            Err(e) => {
                rocket::error!("Failed to load user {}: {e:#}", claims.sub);
                Outcome::Error((Status::InternalServerError, AuthError::Internal))
            }
        }
    }
}

pub fn stage(config: AuthConfig) -> AdHoc {
    AdHoc::on_ignite("Auth", |rocket| async { rocket.manage(config) })
}
