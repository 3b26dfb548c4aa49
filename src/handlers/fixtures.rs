use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::errors::{AppError, Result};
use crate::models::football::{ApiResponse, FixtureQuery, League, Match};
use crate::services::fixture_normalizer::unwrap_fetched;
use crate::state::AppState;

pub async fn get_fixtures(
    State(state): State<AppState>,
    Query(query): Query<FixtureQuery>,
) -> Result<Json<ApiResponse<Vec<Match>>>> {
    tracing::debug!("GET /api/fixtures {:?}", query);
    if let Some(from) = query.from {
        if state.fixtures.window_end(from).is_none() {
            return Err(AppError::invalid_data(format!("from date {} is out of range", from)));
        }
    }

    let (data, source, message) = unwrap_fetched(state.fixtures.fetch_fixtures(query.league, query.from).await);
    Ok(Json(ApiResponse {
        success: true,
        data,
        source,
        message,
    }))
}

pub async fn get_leagues(State(state): State<AppState>) -> Json<ApiResponse<Vec<League>>> {
    let (data, source, message) = unwrap_fetched(state.fixtures.fetch_leagues().await);
    Json(ApiResponse {
        success: true,
        data,
        source,
        message,
    })
}

pub async fn get_match_result(
    State(state): State<AppState>,
    Path(match_id): Path<u64>,
) -> Result<Json<ApiResponse<Match>>> {
    let (data, source, message) = unwrap_fetched(state.fixtures.fetch_match_result(match_id).await);
    let data = data.ok_or(AppError::MatchNotFound(match_id))?;
    Ok(Json(ApiResponse {
        success: true,
        data,
        source,
        message,
    }))
}
