use serde::{Deserialize, Serialize};

// Application-side match shape served to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u64,
    pub home_team: Team,
    pub away_team: Team,
    pub fixture: Fixture,
    pub league: League,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
    pub logo: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub date: String,
    pub timestamp: i64,
    pub timezone: String,
    pub venue: Venue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub logo: String,
    pub season: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatus {
    pub long: String,
    pub short: String,
    pub elapsed: Option<u32>,
}

impl MatchStatus {
    pub fn not_started() -> Self {
        MatchStatus {
            long: "Not Started".to_string(),
            short: "NS".to_string(),
            elapsed: None,
        }
    }

    pub fn has_started(&self) -> bool {
        !matches!(self.short.as_str(), "NS" | "PP" | "CANC")
    }

    pub fn is_finished(&self) -> bool {
        self.short == "FT"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl ScoreLine {
    pub fn new(home: u32, away: u32) -> Self {
        ScoreLine { home: Some(home), away: Some(away) }
    }

    pub fn goals(&self) -> Option<(u32, u32)> {
        Some((self.home?, self.away?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub halftime: ScoreLine,
    pub fulltime: ScoreLine,
}

// Query parameters for fixtures
#[derive(Debug, Deserialize)]
pub struct FixtureQuery {
    pub league: Option<u64>,
    pub from: Option<chrono::NaiveDate>,
}

// Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub source: DataSourceLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceLabel {
    Live,
    Fallback,
}
