use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{AppError, Result};
use crate::services::football_data::query_params_from_json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub endpoint: Option<String>,
    pub params: Option<String>,
}

/// Relays `endpoint` to the football data provider and returns its JSON as is.
pub async fn football_proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Json<Value>> {
    let endpoint = query
        .endpoint
        .filter(|endpoint| !endpoint.trim().is_empty())
        .ok_or(AppError::MissingEndpoint)?;

    let params = match query.params.as_deref() {
        Some(raw) => query_params_from_json(raw)?,
        None => Vec::new(),
    };

    tracing::info!("🔀 Proxying {} ({} params)", endpoint, params.len());

    let data = state.provider.get_json(&endpoint, &params).await.map_err(|failure| {
        tracing::error!("Error in football proxy: {}", failure);
        AppError::from(failure)
    })?;

    Ok(Json(data))
}
