//! Registration, login and session handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use vidova_models::{PublicUser, User, UserRole};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public user fields plus a fresh session token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub token: String,
}

/// Register a new account.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let username = request.username.trim();
    let email = request.email.trim().to_lowercase();
    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Please add all fields"));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let role: UserRole = request
        .role
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e: vidova_models::UserRoleParseError| ApiError::validation(e.to_string()))?
        .unwrap_or_default();

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        email,
        password_hash: hash_password(&request.password)?,
        role,
        organization_id: request.organization_id,
        created_at: chrono::Utc::now(),
    };
    state.users.create(&user).await?;
    info!("Registered user {} ({})", user.username, user.id);

    let token = state.auth.mint(&user)?;
    let response = AuthResponse {
        user: PublicUser::from(&user),
        token,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange credentials for a session token.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = request.email.trim().to_lowercase();

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.auth.mint(&user)?;
    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
        token,
    }))
}

/// Return the authenticated user's profile.
///
/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<PublicUser>> {
    let user = state
        .users
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(&user)))
}
