use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::prediction::{Achievement, Prediction, PredictionStats};
use crate::models::user::Session;
use crate::services::kv_store::{predictions_key, SharedStore};

/// One user's predictions, keyed by match id, mirrored to the key-value store
/// under `predictions-<userId>` after every mutation.
pub struct PredictionStore {
    user_id: String,
    predictions: HashMap<u64, Prediction>,
    storage: SharedStore,
}

impl PredictionStore {
    /// Loads the persisted mapping. Missing, unreadable or corrupt entries all
    /// start the user from an empty mapping; none of them is an error.
    pub async fn load(storage: SharedStore, session: &Session) -> Self {
        let key = predictions_key(&session.user_id);

        let predictions = match storage.get(&key).await {
            Ok(Some(raw)) => parse_stored(&raw).unwrap_or_else(|e| {
                tracing::error!("Error parsing stored predictions for {}: {}", session.user_id, e);
                HashMap::new()
            }),
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::error!("Failed to read predictions for {}: {}", session.user_id, e);
                HashMap::new()
            }
        };

        tracing::debug!("Loaded {} predictions for {}", predictions.len(), session.user_id);

        PredictionStore {
            user_id: session.user_id.clone(),
            predictions,
            storage,
        }
    }

    /// Records a prediction, replacing whatever was stored for the match.
    /// Input is not validated here.
    pub async fn submit(&mut self, match_id: u64, home_score: u32, away_score: u32) -> Prediction {
        self.submit_at(match_id, home_score, away_score, Utc::now()).await
    }

    pub async fn submit_at(
        &mut self,
        match_id: u64,
        home_score: u32,
        away_score: u32,
        created_at: DateTime<Utc>,
    ) -> Prediction {
        let prediction = Prediction::new(match_id, &self.user_id, home_score, away_score, created_at);
        if let Some(previous) = self.predictions.insert(match_id, prediction.clone()) {
            tracing::info!(
                "🔁 {} replaced prediction {}-{} with {}-{} for match {}",
                self.user_id, previous.home_score, previous.away_score, home_score, away_score, match_id
            );
        }
        self.persist().await;
        prediction
    }

    /// Marks the prediction for `match_id` as settled. Returns `None` without
    /// touching storage when the user never predicted that match.
    pub async fn resolve(&mut self, match_id: u64, is_correct: bool, points: u32) -> Option<Prediction> {
        let prediction = self.predictions.get_mut(&match_id)?;
        prediction.is_correct = Some(is_correct);
        prediction.points = Some(points);
        let resolved = prediction.clone();
        self.persist().await;
        Some(resolved)
    }

    pub fn get(&self, match_id: u64) -> Option<&Prediction> {
        self.predictions.get(&match_id)
    }

    pub fn list_all(&self) -> Vec<Prediction> {
        self.predictions.values().cloned().collect()
    }

    /// Drops the prediction so the user can enter a new one.
    pub async fn clear(&mut self, match_id: u64) -> Option<Prediction> {
        let removed = self.predictions.remove(&match_id)?;
        self.persist().await;
        Some(removed)
    }

    pub fn compute_stats(&self) -> PredictionStats {
        compute_stats(self.predictions.values())
    }

    /// Most recent first.
    pub fn recent(&self, limit: usize) -> Vec<Prediction> {
        let mut all = self.list_all();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        all
    }

    // Write failures are logged and otherwise ignored; the in-memory state stays authoritative.
    async fn persist(&self) {
        let key = predictions_key(&self.user_id);
        let payload = match serde_json::to_string(&self.predictions) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize predictions for {}: {}", self.user_id, e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&key, &payload).await {
            tracing::error!("Failed to persist predictions for {}: {}", self.user_id, e);
        }
    }
}

pub fn parse_stored(raw: &str) -> serde_json::Result<HashMap<u64, Prediction>> {
    serde_json::from_str(raw)
}

pub fn compute_stats<'a, I>(predictions: I) -> PredictionStats
where
    I: IntoIterator<Item = &'a Prediction>,
{
    let mut stats = PredictionStats::default();

    for prediction in predictions {
        stats.total_predictions += 1;
        match prediction.is_correct {
            Some(true) => {
                stats.completed_predictions += 1;
                stats.correct_predictions += 1;
                stats.total_earnings += u64::from(prediction.points.unwrap_or(0));
            }
            Some(false) => stats.completed_predictions += 1,
            None => {}
        }
    }

    stats.pending_predictions = stats.total_predictions - stats.completed_predictions;
    stats.win_rate = if stats.completed_predictions > 0 {
        stats.correct_predictions as f64 / stats.completed_predictions as f64 * 100.0
    } else {
        0.0
    };

    stats
}

pub fn achievements(stats: &PredictionStats) -> Vec<Achievement> {
    let total = stats.total_predictions as u64;
    let correct = stats.correct_predictions as u64;

    vec![
        Achievement {
            name: "First Prediction",
            description: "Made your first match prediction",
            unlocked: total >= 1,
            requirement: 1,
            current: total,
        },
        Achievement {
            name: "Perfect Score",
            description: "Got your first exact score prediction right",
            unlocked: correct >= 1,
            requirement: 1,
            current: correct,
        },
        Achievement {
            name: "Prediction Master",
            description: "Made 10 correct predictions",
            unlocked: correct >= 10,
            requirement: 10,
            current: correct,
        },
        Achievement {
            name: "Big Earner",
            description: "Earned $25 in total",
            unlocked: stats.total_earnings >= 25,
            requirement: 25,
            current: stats.total_earnings,
        },
        Achievement {
            name: "Prediction Addict",
            description: "Made 50 predictions",
            unlocked: total >= 50,
            requirement: 50,
            current: total,
        },
        Achievement {
            name: "Fortune Teller",
            description: "Achieved 70% win rate (min 20 predictions)",
            unlocked: stats.completed_predictions >= 20 && stats.win_rate >= 70.0,
            requirement: 70,
            current: stats.win_rate.round() as u64,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::kv_store::{KeyValueStore, MemoryStore};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    async fn empty_store(user: &str) -> (PredictionStore, Arc<MemoryStore>) {
        let backing = Arc::new(MemoryStore::new());
        let store = PredictionStore::load(backing.clone(), &Session::for_user(user)).await;
        (store, backing)
    }

    fn t1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_zero_stats() {
        let (store, _) = empty_store("user-123").await;
        assert_eq!(store.compute_stats(), PredictionStats::default());
        assert_eq!(store.compute_stats().win_rate, 0.0);
        assert!(store.list_all().is_empty());
    }

    #[tokio::test]
    async fn resubmitting_a_match_keeps_only_the_latest() {
        let (mut store, _) = empty_store("user-123").await;
        let t2 = t1() + Duration::minutes(5);

        store.submit_at(10, 2, 1, t1()).await;
        store.submit_at(10, 0, 0, t2).await;

        let current = store.get(10).unwrap();
        assert_eq!((current.home_score, current.away_score), (0, 0));
        assert_eq!(current.created_at, t2);
        assert_eq!(store.list_all().len(), 1);
    }

    #[tokio::test]
    async fn resolving_a_correct_prediction_counts_its_points() {
        let (mut store, _) = empty_store("user-123").await;
        store.submit_at(10, 2, 1, t1()).await;
        store.submit_at(10, 0, 0, t1() + Duration::minutes(5)).await;

        let resolved = store.resolve(10, true, 1).await.unwrap();
        assert_eq!(resolved.is_correct, Some(true));
        assert_eq!(resolved.points, Some(1));

        let prediction = store.get(10).unwrap();
        assert_eq!(prediction.is_correct, Some(true));
        assert_eq!(prediction.points, Some(1));
        assert_eq!(store.compute_stats().total_earnings, 1);
    }

    #[tokio::test]
    async fn resolving_an_unknown_match_is_a_noop() {
        let (mut store, backing) = empty_store("user-123").await;
        assert!(store.resolve(99, true, 1).await.is_none());
        assert!(store.list_all().is_empty());
        assert_eq!(backing.get("predictions-user-123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn stats_partition_predictions() {
        let (mut store, _) = empty_store("user-123").await;
        for match_id in 1..=6 {
            store.submit_at(match_id, 1, 0, t1()).await;
        }
        store.resolve(1, true, 1).await;
        store.resolve(2, true, 3).await;
        store.resolve(3, false, 0).await;
        store.resolve(4, false, 5).await;

        let stats = store.compute_stats();
        assert_eq!(stats.total_predictions, 6);
        assert_eq!(stats.completed_predictions, 4);
        assert_eq!(stats.correct_predictions, 2);
        assert_eq!(stats.pending_predictions, stats.total_predictions - stats.completed_predictions);
        assert_eq!(stats.win_rate, 50.0);
        // points on incorrect predictions never count towards earnings
        assert_eq!(stats.total_earnings, 4);
    }

    #[tokio::test]
    async fn mutations_persist_the_whole_mapping() {
        let (mut store, backing) = empty_store("user-123").await;
        store.submit_at(10, 2, 1, t1()).await;
        store.submit_at(11, 1, 1, t1()).await;

        let raw = backing.get("predictions-user-123").await.unwrap().unwrap();
        let stored = parse_stored(&raw).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[&10u64].home_score, 2);

        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["11"]["userId"], "user-123");

        let reloaded = PredictionStore::load(backing.clone(), &Session::for_user("user-123")).await;
        assert_eq!(reloaded.get(11), store.get(11));
    }

    #[tokio::test]
    async fn corrupt_storage_resets_to_empty() {
        let backing = Arc::new(MemoryStore::with_entries([("predictions-user-123", "{not json")]));
        let mut store = PredictionStore::load(backing.clone(), &Session::for_user("user-123")).await;
        assert!(store.list_all().is_empty());

        store.submit_at(5, 3, 3, t1()).await;
        let raw = backing.get("predictions-user-123").await.unwrap().unwrap();
        assert_eq!(parse_stored(&raw).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stores_are_scoped_per_user() {
        let backing = Arc::new(MemoryStore::new());
        let mut alice = PredictionStore::load(backing.clone(), &Session::for_user("alice")).await;
        alice.submit_at(10, 1, 0, t1()).await;

        let bob = PredictionStore::load(backing.clone(), &Session::for_user("bob")).await;
        assert!(bob.get(10).is_none());
    }

    #[tokio::test]
    async fn clear_removes_the_prediction() {
        let (mut store, _) = empty_store("user-123").await;
        store.submit_at(10, 2, 2, t1()).await;
        assert!(store.clear(10).await.is_some());
        assert!(store.get(10).is_none());
        assert!(store.clear(10).await.is_none());
    }

    #[tokio::test]
    async fn recent_orders_newest_first() {
        let (mut store, _) = empty_store("user-123").await;
        for (offset, match_id) in [(0, 1), (10, 2), (5, 3)] {
            store.submit_at(match_id, 0, 0, t1() + Duration::minutes(offset)).await;
        }
        let ids: Vec<u64> = store.recent(2).iter().map(|p| p.match_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn achievements_track_thresholds() {
        let stats = PredictionStats {
            total_predictions: 25,
            completed_predictions: 20,
            correct_predictions: 15,
            win_rate: 75.0,
            total_earnings: 15,
            pending_predictions: 5,
        };
        let unlocked: Vec<&str> = achievements(&stats)
            .into_iter()
            .filter(|a| a.unlocked)
            .map(|a| a.name)
            .collect();
        assert_eq!(
            unlocked,
            vec!["First Prediction", "Perfect Score", "Prediction Master", "Fortune Teller"]
        );
    }

    #[test]
    fn fortune_teller_needs_enough_completed_predictions() {
        let stats = PredictionStats {
            total_predictions: 3,
            completed_predictions: 3,
            correct_predictions: 3,
            win_rate: 100.0,
            total_earnings: 3,
            pending_predictions: 0,
        };
        let fortune_teller = achievements(&stats).pop().unwrap();
        assert!(!fortune_teller.unlocked);
        assert_eq!(fortune_teller.current, 100);
    }
}
