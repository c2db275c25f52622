//! Register, login and profile handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::backend::auth::{sessions, users};
use crate::backend::error::ApiError;
use crate::backend::middleware::AuthUser;
use crate::shared::user::UserProfile;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.username.trim().len() < 3 {
        return Err(ApiError::validation(
            "username",
            "must be at least 3 characters",
        ));
    }
    if !req.email.contains('@') || !req.email.contains('.') {
        return Err(ApiError::validation("email", "must be a valid email address"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::validation(
            "password",
            "must be at least 6 characters",
        ));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    State(pool): State<PgPool>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_registration(&req)?;

    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_string();

    if users::identity_taken(&pool, &email, &username).await? {
        return Err(ApiError::validation(
            "email",
            "an account with this email or username already exists",
        ));
    }

    let hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let user = users::create_user(&pool, &username, &email, &hash).await?;
    tracing::info!(user_id = %user.id, "registered new user");

    let token = sessions::create_token(user.id, user.email.clone())?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into_profile(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(pool): State<PgPool>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();

    let user = users::find_by_email(&pool, &email)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let matches = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))?;
    if !matches {
        return Err(ApiError::Unauthenticated);
    }

    let token = sessions::create_token(user.id, user.email.clone())?;
    Ok(Json(AuthResponse {
        token,
        user: user.into_profile(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(pool): State<PgPool>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let user = users::find_by_id(&pool, auth.user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(user.into_profile()))
}
