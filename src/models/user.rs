use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// Profile stored under `user-<id>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub password_hash: String,
}

impl User {
    pub fn avatar_for(email: &str) -> String {
        let seed: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", seed)
    }

    // Names default to the local part of the e-mail address
    pub fn default_name(email: &str) -> String {
        email.split('@').next().unwrap_or(email).to_string()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(email(message = "A valid e-mail address is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            joined_at: user.joined_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

/// The authenticated caller. Handlers receive it from the auth middleware and
/// pass it on explicitly; nothing in the crate keeps a "current user" global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

#[cfg(test)]
impl Session {
    pub fn for_user(user_id: &str) -> Self {
        Session {
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            name: user_id.to_string(),
        }
    }
}
