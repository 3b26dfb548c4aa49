use axum::{routing::get, Router};

use crate::handlers::{fixtures, predictions, proxy};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Example: /api/fixtures?league=2021&from=2025-01-15
        .route("/fixtures", get(fixtures::get_fixtures))
        .route("/fixtures/:id/result", get(fixtures::get_match_result))
        .route("/leagues", get(fixtures::get_leagues))
        .route("/leaderboard", get(predictions::get_leaderboard))
}

pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        // Example: /api/football-proxy?endpoint=/matches&params={"dateFrom":"2025-01-15"}
        .route("/football-proxy", get(proxy::football_proxy))
}
