use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::prediction::{
    LeaderboardEntry, Prediction, PredictionStats, RecentPrediction, ResolvePredictionRequest, StatsSummary,
    SubmitPredictionRequest,
};
use crate::models::user::Session;
use crate::services::prediction_store::achievements;
use crate::state::AppState;

const RECENT_LIMIT: usize = 5;
const NEXT_ACHIEVEMENTS: usize = 3;

pub async fn list_predictions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<Vec<Prediction>> {
    let store = state.predictions.store_for(&session).await;
    let mut predictions = store.lock().await.list_all();
    predictions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(predictions)
}

pub async fn get_prediction(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(match_id): Path<u64>,
) -> Result<Json<Prediction>> {
    let store = state.predictions.store_for(&session).await;
    let prediction = store.lock().await.get(match_id).cloned();
    prediction.map(Json).ok_or(AppError::PredictionNotFound(match_id))
}

pub async fn submit_prediction(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(match_id): Path<u64>,
    Json(payload): Json<SubmitPredictionRequest>,
) -> Result<(StatusCode, Json<Prediction>)> {
    payload.validate()?;
    let home = u32::try_from(payload.home_score).map_err(|_| AppError::invalid_data("Invalid home score"))?;
    let away = u32::try_from(payload.away_score).map_err(|_| AppError::invalid_data("Invalid away score"))?;

    state.predictions.ensure_open(&state.fixtures, match_id).await?;

    let store = state.predictions.store_for(&session).await;
    let prediction = store.lock().await.submit(match_id, home, away).await;

    tracing::info!("🎯 {} ({}) predicted {}-{} for match {}", session.name, session.user_id, home, away, match_id);
    Ok((StatusCode::CREATED, Json(prediction)))
}

pub async fn clear_prediction(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(match_id): Path<u64>,
) -> Result<Json<Prediction>> {
    state.predictions.ensure_open(&state.fixtures, match_id).await?;

    let store = state.predictions.store_for(&session).await;
    let removed = store.lock().await.clear(match_id).await;
    removed.map(Json).ok_or(AppError::PredictionNotFound(match_id))
}

// Resolving a match the user never predicted succeeds with an empty body.
pub async fn resolve_prediction(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(match_id): Path<u64>,
    Json(payload): Json<ResolvePredictionRequest>,
) -> Json<Option<Prediction>> {
    let store = state.predictions.store_for(&session).await;
    let resolved = store
        .lock()
        .await
        .resolve(match_id, payload.is_correct, payload.points)
        .await;
    if resolved.is_none() {
        tracing::debug!("No prediction to resolve for match {} ({})", match_id, session.user_id);
    }
    Json(resolved)
}

pub async fn settle_prediction(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(match_id): Path<u64>,
) -> Result<Json<Prediction>> {
    let settled = state.predictions.settle(&session, &state.fixtures, match_id).await?;
    Ok(Json(settled))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<PredictionStats> {
    let store = state.predictions.store_for(&session).await;
    let stats = store.lock().await.compute_stats();
    Json(stats)
}

pub async fn get_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<StatsSummary> {
    let store = state.predictions.store_for(&session).await;
    let (stats, recent) = {
        let store = store.lock().await;
        (store.compute_stats(), store.recent(RECENT_LIMIT))
    };

    let achievements = achievements(&stats);
    // Locked achievements, closest to unlocking first
    let mut next_achievements: Vec<_> = achievements.iter().filter(|a| !a.unlocked).cloned().collect();
    next_achievements.sort_by(|a, b| b.progress().total_cmp(&a.progress()));
    next_achievements.truncate(NEXT_ACHIEVEMENTS);

    Json(StatsSummary {
        all_unlocked: next_achievements.is_empty(),
        recent_predictions: recent
            .into_iter()
            .map(|prediction| RecentPrediction {
                outcome: prediction.outcome(),
                prediction,
            })
            .collect(),
        stats,
        achievements,
        next_achievements,
    })
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let board = state.predictions.leaderboard(limit).await?;
    Ok(Json(board))
}
