use anyhow::Context;
use axum::extract::State;
use axum::{http::Method, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use services::kv_store::connect_store;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!("⚙️ Configuration: {}", config.get_config_info());

    let store = connect_store(config.redis_url.as_deref()).await;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let app = build_router(AppState::new(config, store));
    start_server(app, addr).await
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(api_health_check))
        .nest("/api/auth", routes::auth::routes(app_state.clone()))
        .nest("/api/predictions", routes::predictions::routes(app_state.clone()))
        .nest("/api", routes::fixtures::routes().merge(routes::fixtures::proxy_routes()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn root_handler() -> &'static str {
    "⚽ Score Predictor API"
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    let storage_status = match state.store.get("health-probe").await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "storage": state.store.backend(),
        "storage_status": storage_status,
        "football_api_key_set": !state.config.football_api_key.is_empty(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::football_data::stub::StubProvider;
    use crate::services::football_data::FetchFailure;
    use crate::services::kv_store::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn app_with(provider: StubProvider) -> (Router, Arc<StubProvider>) {
        let provider = Arc::new(provider);
        let state = AppState::with_provider(AppConfig::for_tests(), Arc::new(MemoryStore::new()), provider.clone());
        (build_router(state), provider)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn with_json(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn authed_get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            with_json(Method::POST, "/api/auth/register", None, json!({ "email": email, "password": "secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    fn upcoming_match(id: u64) -> Value {
        json!({
            "id": id,
            "utcDate": "2099-05-01T15:00:00Z",
            "status": "TIMED",
            "competition": { "id": 2021, "name": "Premier League", "code": "PL" },
            "homeTeam": { "id": 66, "name": "Manchester United FC" },
            "awayTeam": { "id": 64, "name": "Liverpool FC" }
        })
    }

    #[tokio::test]
    async fn cors_preflight_is_accepted() {
        let (app, _) = app_with(StubProvider::unreachable());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/football-proxy")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn proxy_requires_an_endpoint() {
        let (app, _) = app_with(StubProvider::unreachable());
        let (status, body) = send(&app, get("/api/football-proxy")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing endpoint parameter");
    }

    #[tokio::test]
    async fn proxy_returns_upstream_json_verbatim() {
        let upstream = json!({ "count": 1, "competitions": [{ "id": 2021, "code": "PL" }] });
        let (app, provider) = app_with(StubProvider::new().with("/competitions", Ok(upstream.clone())));

        let (status, body) = send(
            &app,
            get("/api/football-proxy?endpoint=/competitions&params=%7B%22areas%22%3A2072%2C%22plan%22%3Anull%7D"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, upstream);
        assert_eq!(
            provider.recorded(),
            vec![("/competitions".to_string(), vec![("areas".to_string(), "2072".to_string())])]
        );
    }

    #[tokio::test]
    async fn proxy_upstream_failure_is_a_500_envelope() {
        let (app, _) = app_with(StubProvider::new().with("/matches", Err(FetchFailure::UpstreamStatus(429))));
        let (status, body) = send(&app, get("/api/football-proxy?endpoint=/matches")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch data from football API");
        assert!(body["message"].as_str().unwrap().contains("429"));
    }

    #[tokio::test]
    async fn fixtures_degrade_to_sample_data() {
        let (app, _) = app_with(StubProvider::unreachable());
        let (status, body) = send(&app, get("/api/fixtures")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["data"].as_array().unwrap().len(), 5);

        let (_, body) = send(&app, get("/api/leagues")).await;
        assert_eq!(body["data"][0]["name"], "Premier League");
    }

    #[tokio::test]
    async fn fixtures_reject_a_from_date_past_the_calendar() {
        let (app, provider) = app_with(StubProvider::unreachable());
        let last_day = chrono::NaiveDate::MAX.to_string().replace('+', "%2B");

        let (status, body) = send(&app, get(&format!("/api/fixtures?from={}", last_day))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert!(provider.recorded().is_empty());

        let (status, _) = send(&app, get("/api/fixtures?league=2021&from=2025-01-10")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn predictions_require_a_session() {
        let (app, _) = app_with(StubProvider::unreachable());
        let (status, _) = send(&app, get("/api/predictions")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, authed_get("/api/predictions/stats", "not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn submit_resolve_and_read_stats() {
        let (app, _) = app_with(StubProvider::new().with("/matches/10", Ok(upcoming_match(10))));
        let token = register(&app, "fan@example.com").await;

        let (status, _) = send(
            &app,
            with_json(Method::PUT, "/api/predictions/10", Some(&token), json!({ "homeScore": 2, "awayScore": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, latest) = send(
            &app,
            with_json(Method::PUT, "/api/predictions/10", Some(&token), json!({ "homeScore": 0, "awayScore": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(latest["homeScore"], 0);

        let (_, stored) = send(&app, authed_get("/api/predictions/10", &token)).await;
        assert_eq!(stored["id"], latest["id"]);
        assert_eq!(stored["awayScore"], 0);

        let (status, resolved) = send(
            &app,
            with_json(Method::PUT, "/api/predictions/10/result", Some(&token), json!({ "isCorrect": true, "points": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["isCorrect"], true);

        let (_, stats) = send(&app, authed_get("/api/predictions/stats", &token)).await;
        assert_eq!(stats["totalPredictions"], 1);
        assert_eq!(stats["totalEarnings"], 1);
        assert_eq!(stats["winRate"], 100.0);
        assert_eq!(stats["pendingPredictions"], 0);

        let (_, summary) = send(&app, authed_get("/api/predictions/summary", &token)).await;
        assert_eq!(summary["recentPredictions"][0]["outcome"], "correct");
        assert_eq!(summary["achievements"][0]["unlocked"], true);
    }

    #[tokio::test]
    async fn resolving_unknown_match_returns_null() {
        let (app, _) = app_with(StubProvider::unreachable());
        let token = register(&app, "quiet@example.com").await;
        let (status, body) = send(
            &app,
            with_json(Method::PUT, "/api/predictions/77/result", Some(&token), json!({ "isCorrect": true, "points": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn unknown_match_cannot_be_predicted() {
        let (app, _) = app_with(StubProvider::new().with("/matches/404", Err(FetchFailure::UpstreamStatus(404))));
        let token = register(&app, "fan@example.com").await;

        let (status, body) = send(
            &app,
            with_json(Method::PUT, "/api/predictions/404", Some(&token), json!({ "homeScore": 1, "awayScore": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Match not found");

        let (status, _) = send(&app, authed_get("/api/predictions/404", &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn out_of_range_scores_are_rejected() {
        let (app, _) = app_with(StubProvider::unreachable());
        let token = register(&app, "fan@example.com").await;
        let (status, body) = send(
            &app,
            with_json(Method::PUT, "/api/predictions/10", Some(&token), json!({ "homeScore": -1, "awayScore": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
    }

    #[tokio::test]
    async fn login_checks_the_password() {
        let (app, _) = app_with(StubProvider::unreachable());
        register(&app, "fan@example.com").await;

        let (status, _) = send(
            &app,
            with_json(Method::POST, "/api/auth/login", None, json!({ "email": "fan@example.com", "password": "wrong-one" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            with_json(Method::POST, "/api/auth/login", None, json!({ "email": "fan@example.com", "password": "secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap();

        let (_, me) = send(&app, authed_get("/api/auth/me", token)).await;
        assert_eq!(me["name"], "fan");
        assert_eq!(me["email"], "fan@example.com");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (app, _) = app_with(StubProvider::unreachable());
        register(&app, "fan@example.com").await;
        let (status, _) = send(
            &app,
            with_json(Method::POST, "/api/auth/register", None, json!({ "email": "FAN@example.com", "password": "secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn leaderboard_lists_registered_predictors() {
        let (app, _) = app_with(StubProvider::new().with("/matches/10", Ok(upcoming_match(10))));
        let token = register(&app, "top@example.com").await;
        send(
            &app,
            with_json(Method::PUT, "/api/predictions/10", Some(&token), json!({ "homeScore": 1, "awayScore": 0 })),
        )
        .await;

        let (status, board) = send(&app, get("/api/leaderboard")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board[0]["name"], "top");
        assert_eq!(board[0]["rank"], 1);
        assert_eq!(board[0]["totalPredictions"], 1);
    }
}
