use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// Stored shape, also the JSON written under `predictions-<userId>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub match_id: u64,
    pub user_id: String,
    pub home_score: u32,
    pub away_score: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

impl Prediction {
    pub fn new(match_id: u64, user_id: &str, home_score: u32, away_score: u32, created_at: DateTime<Utc>) -> Self {
        Prediction {
            id: format!("{}-{}-{}", match_id, user_id, created_at.timestamp_millis()),
            match_id,
            user_id: user_id.to_string(),
            home_score,
            away_score,
            created_at,
            is_correct: None,
            points: None,
        }
    }

    pub fn outcome(&self) -> PredictionOutcome {
        match self.is_correct {
            None => PredictionOutcome::Pending,
            Some(true) => PredictionOutcome::Correct,
            Some(false) => PredictionOutcome::Incorrect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionOutcome {
    Pending,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionStats {
    pub total_predictions: usize,
    pub completed_predictions: usize,
    pub correct_predictions: usize,
    pub win_rate: f64,
    pub total_earnings: u64,
    pub pending_predictions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
    pub requirement: u64,
    pub current: u64,
}

impl Achievement {
    // Percentage towards the requirement, capped at 100
    pub fn progress(&self) -> f64 {
        if self.requirement == 0 {
            return 100.0;
        }
        (self.current as f64 / self.requirement as f64 * 100.0).min(100.0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPrediction {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub outcome: PredictionOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub stats: PredictionStats,
    pub achievements: Vec<Achievement>,
    pub next_achievements: Vec<Achievement>,
    pub all_unlocked: bool,
    pub recent_predictions: Vec<RecentPrediction>,
}

// Incoming score submission. Scores are signed so that negatives reach the
// validator instead of failing JSON deserialization with an opaque message.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPredictionRequest {
    #[validate(range(min = 0, max = 20, message = "Scores must be between 0 and 20"))]
    pub home_score: i64,
    #[validate(range(min = 0, max = 20, message = "Scores must be between 0 and 20"))]
    pub away_score: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvePredictionRequest {
    pub is_correct: bool,
    pub points: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    pub correct_predictions: usize,
    pub total_predictions: usize,
    pub win_rate: f64,
    pub earnings: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prediction_id_combines_match_user_and_time() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let prediction = Prediction::new(10, "user-123", 2, 1, at);
        assert_eq!(prediction.id, format!("10-user-123-{}", at.timestamp_millis()));
        assert_eq!(prediction.outcome(), PredictionOutcome::Pending);
    }

    #[test]
    fn unresolved_fields_are_omitted_from_json() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let value = serde_json::to_value(Prediction::new(3, "u", 0, 0, at)).unwrap();
        assert_eq!(value["matchId"], 3);
        assert_eq!(value["homeScore"], 0);
        assert!(value.get("isCorrect").is_none());
        assert!(value.get("points").is_none());
    }

    #[test]
    fn negative_scores_fail_validation() {
        let request = SubmitPredictionRequest { home_score: -1, away_score: 2 };
        assert!(request.validate().is_err());

        let request = SubmitPredictionRequest { home_score: 0, away_score: 20 };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn achievement_progress_is_capped() {
        let achievement = Achievement {
            name: "Big Earner",
            description: "Earned $25 in total",
            unlocked: true,
            requirement: 25,
            current: 40,
        };
        assert_eq!(achievement.progress(), 100.0);
    }
}
