use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::predictions::{
    clear_prediction, get_prediction, get_stats, get_summary, list_predictions, resolve_prediction,
    settle_prediction, submit_prediction,
};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        // GET /api/predictions - the caller's predictions, newest first
        .route("/", get(list_predictions))

        // GET /api/predictions/stats - win rate, earnings, pending count
        .route("/stats", get(get_stats))

        // GET /api/predictions/summary - stats plus achievements and recent activity
        .route("/summary", get(get_summary))

        // PUT replaces any earlier prediction for the match, DELETE clears it before kickoff
        .route(
            "/:match_id",
            get(get_prediction).put(submit_prediction).delete(clear_prediction),
        )
        .route("/:match_id/result", put(resolve_prediction))
        .route("/:match_id/settle", post(settle_prediction))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
