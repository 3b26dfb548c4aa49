// config.rs
use std::env;
use std::str::FromStr;

use crate::errors::{AppError, Result};
use crate::services::fixture_normalizer::MAX_WINDOW_DAYS;

pub const DEFAULT_FOOTBALL_API_BASE_URL: &str = "https://api.football-data.org/v4";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub football_api_base_url: String,
    pub football_api_key: String,
    pub fixture_window_days: i64,
    pub redis_url: Option<String>,
    pub prediction_cache_size: usize,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let football_api_key = env::var("FOOTBALL_API_KEY").unwrap_or_default();
        if football_api_key.is_empty() {
            tracing::warn!("FOOTBALL_API_KEY is not set, upstream calls will likely be rejected");
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET is not set, using the development secret");
            "dev-secret-change-in-production".to_string()
        });

        Ok(AppConfig {
            football_api_base_url: env::var("FOOTBALL_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FOOTBALL_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            football_api_key,
            fixture_window_days: window_days(parse_var("FIXTURE_WINDOW_DAYS", 7)?)?,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            prediction_cache_size: parse_var("PREDICTION_CACHE_SIZE", 1024)?,
            jwt_secret,
            jwt_ttl_hours: parse_var("JWT_TTL_HOURS", 24)?,
            port: parse_var("PORT", 10000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        })
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        serde_json::json!({
            "football_api_base_url": self.football_api_base_url,
            "football_api_key_set": !self.football_api_key.is_empty(),
            "fixture_window_days": self.fixture_window_days,
            "storage": if self.redis_url.is_some() { "redis" } else { "memory" },
            "prediction_cache_size": self.prediction_cache_size,
            "jwt_ttl_hours": self.jwt_ttl_hours,
            "port": self.port,
            "host": self.host,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

fn window_days(days: i64) -> Result<i64> {
    if (1..=MAX_WINDOW_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(AppError::configuration(format!(
            "FIXTURE_WINDOW_DAYS must be between 1 and {}, got {}",
            MAX_WINDOW_DAYS, days
        )))
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        AppConfig {
            football_api_base_url: "http://127.0.0.1:9".to_string(),
            football_api_key: "test-key".to_string(),
            fixture_window_days: 7,
            redis_url: None,
            prediction_cache_size: 64,
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_hours: 1,
            port: 0,
            host: "127.0.0.1".to_string(),
        }
    }
}
