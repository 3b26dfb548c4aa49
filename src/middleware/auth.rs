use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::errors::{AppError, Result};
use crate::models::user::{Claims, Session, User};
use crate::state::AppState;

pub fn issue_token(secret: &str, ttl_hours: i64, user: &User) -> Result<String> {
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn session_from_token(secret: &str, token: &str) -> Result<Session> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(Session::from(token_data.claims))
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::AuthError)?;

    let session = session_from_token(&state.config.jwt_secret, token)?;

    // Handlers pick the session up with Extension<Session>
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
