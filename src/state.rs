use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::fixture_normalizer::FixtureNormalizer;
use crate::services::football_data::{FootballDataClient, FootballProvider};
use crate::services::kv_store::SharedStore;
use crate::services::prediction_service::PredictionService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub provider: Arc<dyn FootballProvider>,
    pub fixtures: FixtureNormalizer,
    pub predictions: Arc<PredictionService>,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedStore) -> Self {
        let provider: Arc<dyn FootballProvider> = Arc::new(FootballDataClient::new(
            config.football_api_base_url.clone(),
            config.football_api_key.clone(),
        ));
        Self::with_provider(config, store, provider)
    }

    pub fn with_provider(config: AppConfig, store: SharedStore, provider: Arc<dyn FootballProvider>) -> Self {
        AppState {
            fixtures: FixtureNormalizer::new(provider.clone(), config.fixture_window_days),
            predictions: Arc::new(PredictionService::new(store.clone(), config.prediction_cache_size)),
            config: Arc::new(config),
            store,
            provider,
        }
    }
}
