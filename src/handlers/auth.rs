use axum::{
    extract::State,
    response::Json,
    Extension,
};
use bcrypt::{hash, verify};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::middleware::auth::issue_token;
use crate::models::user::{AuthResponse, LoginUser, RegisterUser, Session, User, UserResponse};
use crate::services::kv_store::{user_email_key, user_key, SharedStore};
use crate::state::AppState;

#[cfg(not(test))]
const PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const PASSWORD_COST: u32 = 4;

async fn load_user(store: &SharedStore, user_id: &str) -> Result<Option<User>> {
    match store.get(&user_key(user_id)).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw).map_err(|e| {
            AppError::storage(format!("Corrupt profile for {}: {}", user_id, e))
        })?)),
        None => Ok(None),
    }
}

fn auth_response(state: &AppState, user: &User) -> Result<Json<AuthResponse>> {
    let token = issue_token(&state.config.jwt_secret, state.config.jwt_ttl_hours, user)?;
    Ok(Json(AuthResponse {
        user: UserResponse::from(user),
        token,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let email_key = user_email_key(&payload.email);
    if state.store.get(&email_key).await?.is_some() {
        tracing::info!("Registration rejected, {} already exists", payload.email);
        return Err(AppError::DuplicateKey);
    }

    let user = User {
        id: Uuid::new_v4().simple().to_string(),
        name: payload
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| User::default_name(&payload.email)),
        avatar: Some(User::avatar_for(&payload.email)),
        email: payload.email.clone(),
        joined_at: Utc::now(),
        password_hash: hash(&payload.password, PASSWORD_COST)?,
    };

    state.store.set(&user_key(&user.id), &serde_json::to_string(&user)?).await?;
    state.store.set(&email_key, &user.id).await?;

    tracing::info!("👤 Registered {} as {}", user.email, user.id);
    auth_response(&state, &user)
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let user_id = state
        .store
        .get(&user_email_key(&payload.email))
        .await?
        .ok_or(AppError::AuthError)?;
    let user = load_user(&state.store, &user_id)
        .await?
        .ok_or(AppError::AuthError)?;

    if !verify(&payload.password, &user.password_hash)? {
        tracing::info!("Login failed for {}", payload.email);
        return Err(AppError::AuthError);
    }

    tracing::info!("🔑 {} logged in", user.id);
    auth_response(&state, &user)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserResponse>> {
    let user = load_user(&state.store, &session.user_id).await?.ok_or_else(|| {
        tracing::warn!("Token for {} has no stored profile", session.email);
        AppError::AuthError
    })?;
    Ok(Json(UserResponse::from(&user)))
}
