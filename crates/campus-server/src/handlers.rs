//! Route handlers.

use crate::error::ApiError;
use crate::extract::{ApiForm, ApiJson, CurrentUser};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use campus_auth::{Registration, Role, UserRecord, require_roles};
use campus_token::TokenPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserRead {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserRead {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// OAuth2 password-grant form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    Json(json!({
        "app_name": config.app_name,
        "environment": config.environment,
        "api_prefix": config.server.api_prefix,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserRead>), ApiError> {
    let user = state
        .auth()
        .register(
            Registration {
                email: body.email,
                password: body.password,
                full_name: body.full_name,
            },
            Role::Member,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state
        .auth()
        .authenticate(&form.username, &form.password)
        .await?;
    Ok(Json(pair))
}

pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state.auth().refresh(&body.refresh_token).await?;
    Ok(Json(pair))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserRead> {
    Json(user.into())
}

/// Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserRead>>, ApiError> {
    require_roles(&user, &[Role::Admin])?;
    let users = state
        .auth()
        .store()
        .list()
        .await
        .map_err(campus_auth::AuthError::from)?;
    Ok(Json(users.into_iter().map(UserRead::from).collect()))
}
