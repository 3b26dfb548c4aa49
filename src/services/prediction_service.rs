use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::errors::{AppError, Result};
use crate::models::football::Match;
use crate::models::prediction::{LeaderboardEntry, Prediction};
use crate::models::user::{Session, User};
use crate::services::fixture_normalizer::{Degraded, FixtureNormalizer};
use crate::services::football_data::FetchFailure;
use crate::services::kv_store::{user_key, SharedStore};
use crate::services::prediction_store::{compute_stats, parse_stored, PredictionStore};

pub const POINTS_PER_CORRECT_PREDICTION: u32 = 1;
const PREDICTIONS_PREFIX: &str = "predictions-";

type SharedPredictionStore = Arc<Mutex<PredictionStore>>;

/// Hands out one store per user. Each store sits behind its own mutex, so a
/// user's predictions have a single writer however many requests arrive.
///
/// At most `capacity` stores stay cached. Past that, stores no request is
/// holding are dropped; they persist on every mutation, so the next access
/// reloads them from storage.
pub struct PredictionService {
    storage: SharedStore,
    stores: RwLock<HashMap<String, SharedPredictionStore>>,
    capacity: usize,
    // Bumped under the write lock whenever stores are evicted
    evictions: AtomicU64,
}

impl PredictionService {
    pub fn new(storage: SharedStore, capacity: usize) -> Self {
        Self {
            storage,
            stores: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            evictions: AtomicU64::new(0),
        }
    }

    pub async fn store_for(&self, session: &Session) -> SharedPredictionStore {
        loop {
            if let Some(store) = self.stores.read().await.get(&session.user_id) {
                return store.clone();
            }

            // Load without holding the map lock; storage may be a network hop away.
            let generation = self.evictions.load(Ordering::Acquire);
            let loaded = Arc::new(Mutex::new(PredictionStore::load(self.storage.clone(), session).await));

            let mut stores = self.stores.write().await;
            if let Some(store) = stores.get(&session.user_id) {
                return store.clone();
            }
            if self.evictions.load(Ordering::Acquire) != generation {
                // A store evicted meanwhile may have persisted after our read
                continue;
            }

            let store = stores.entry(session.user_id.clone()).or_insert(loaded).clone();
            if stores.len() > self.capacity {
                self.evict_idle(&mut stores);
            }
            return store;
        }
    }

    fn evict_idle(&self, stores: &mut HashMap<String, SharedPredictionStore>) {
        let before = stores.len();
        stores.retain(|_, store| Arc::strong_count(store) > 1);
        let evicted = before - stores.len();
        if evicted > 0 {
            self.evictions.fetch_add(1, Ordering::AcqRel);
            tracing::debug!("Evicted {} idle prediction stores, {} cached", evicted, stores.len());
        }
    }

    #[cfg(test)]
    async fn cached_stores(&self) -> usize {
        self.stores.read().await.len()
    }

    /// Rejects changes once live data shows the match has kicked off, and
    /// matches the provider does not know. Other upstream failures never
    /// block a prediction.
    pub async fn ensure_open(&self, normalizer: &FixtureNormalizer, match_id: u64) -> Result<()> {
        match normalizer.fetch_match_result(match_id).await {
            Ok(Some(m)) if has_kicked_off(&m) => Err(AppError::MatchStarted(match_id)),
            Ok(_) => Ok(()),
            Err(Degraded {
                failure: FetchFailure::UpstreamStatus(404),
                ..
            }) => Err(AppError::MatchNotFound(match_id)),
            Err(degraded) => {
                tracing::warn!(
                    "Could not confirm kickoff for match {} ({}), accepting prediction",
                    match_id, degraded.failure
                );
                Ok(())
            }
        }
    }

    /// Resolves the caller's prediction from the live final score: an exact
    /// score earns `POINTS_PER_CORRECT_PREDICTION`, anything else earns 0.
    pub async fn settle(&self, session: &Session, normalizer: &FixtureNormalizer, match_id: u64) -> Result<Prediction> {
        let store = self.store_for(session).await;
        let predicted = store
            .lock()
            .await
            .get(match_id)
            .map(|p| (p.home_score, p.away_score))
            .ok_or(AppError::PredictionNotFound(match_id))?;

        let result = match normalizer.fetch_match_result(match_id).await {
            Ok(Some(result)) => result,
            Ok(None)
            | Err(Degraded {
                failure: FetchFailure::UpstreamStatus(404),
                ..
            }) => return Err(AppError::MatchNotFound(match_id)),
            Err(degraded) => {
                tracing::warn!("Not settling match {} on sample data: {}", match_id, degraded.failure);
                return Err(AppError::ResultNotAvailable(match_id));
            }
        };

        let final_score = result
            .score
            .and_then(|score| score.fulltime.goals())
            .filter(|_| result.status.is_finished())
            .ok_or(AppError::ResultNotAvailable(match_id))?;

        let is_correct = predicted == final_score;
        let points = if is_correct { POINTS_PER_CORRECT_PREDICTION } else { 0 };

        let resolved = store
            .lock()
            .await
            .resolve(match_id, is_correct, points)
            .await
            .ok_or(AppError::PredictionNotFound(match_id))?;

        tracing::info!(
            "🏁 Settled match {} for {}: predicted {}-{}, final {}-{}, correct={}",
            match_id, session.user_id, predicted.0, predicted.1, final_score.0, final_score.1, is_correct
        );
        Ok(resolved)
    }

    /// Ranks every user with stored predictions by earnings, then win rate,
    /// then correct predictions.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let keys = self.storage.keys_with_prefix(PREDICTIONS_PREFIX).await?;
        let mut entries = Vec::with_capacity(keys.len());

        for key in keys {
            let Some(user_id) = key.strip_prefix(PREDICTIONS_PREFIX) else {
                continue;
            };
            let Some(raw) = self.storage.get(&key).await? else {
                continue;
            };
            let predictions = match parse_stored(&raw) {
                Ok(predictions) => predictions,
                Err(e) => {
                    tracing::warn!("Skipping unreadable predictions for {}: {}", user_id, e);
                    continue;
                }
            };

            let stats = compute_stats(predictions.values());
            entries.push(LeaderboardEntry {
                rank: 0,
                user_id: user_id.to_string(),
                name: self.display_name(user_id).await,
                correct_predictions: stats.correct_predictions,
                total_predictions: stats.total_predictions,
                win_rate: stats.win_rate,
                earnings: stats.total_earnings,
            });
        }

        entries.sort_by(|a, b| {
            b.earnings
                .cmp(&a.earnings)
                .then_with(|| b.win_rate.total_cmp(&a.win_rate))
                .then_with(|| b.correct_predictions.cmp(&a.correct_predictions))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        entries.truncate(limit);
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.rank = index + 1;
        }

        Ok(entries)
    }

    async fn display_name(&self, user_id: &str) -> String {
        match self.storage.get(&user_key(user_id)).await {
            Ok(Some(raw)) => serde_json::from_str::<User>(&raw)
                .map(|user| user.name)
                .unwrap_or_else(|_| user_id.to_string()),
            _ => user_id.to_string(),
        }
    }
}

fn has_kicked_off(m: &Match) -> bool {
    if m.status.has_started() {
        return true;
    }
    m.status.short == "NS" && m.fixture.timestamp > 0 && m.fixture.timestamp <= Utc::now().timestamp()
}
