use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::football::{DataSourceLabel, Fixture, League, Match, MatchStatus, Score, ScoreLine, Team, Venue};
use crate::models::provider::{
    ProviderCompetition, ProviderCompetitionsResponse, ProviderMatch, ProviderMatchesResponse, ProviderScoreLine,
    ProviderTeam,
};
use crate::services::fallback_data;
use crate::services::football_data::{FetchFailure, FootballProvider};

/// Competition codes exposed by `fetch_leagues`.
pub const MAJOR_COMPETITIONS: [&str; 6] = ["PL", "PD", "BL1", "SA", "FL1", "CL"];

/// Upper bound for the fixture window, in days.
pub const MAX_WINDOW_DAYS: i64 = 31;

const UNKNOWN: &str = "Unknown";
const TEAM_CREST_SIZE: u32 = 64;
const LEAGUE_CREST_SIZE: u32 = 24;

/// Sample data handed back instead of live data, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded<T> {
    pub fallback: T,
    pub failure: FetchFailure,
}

/// `Ok` holds live provider data, `Err` the fallback and why it was used.
pub type Fetched<T> = Result<T, Degraded<T>>;

/// Collapses a fetch result into its data plus a label for API responses.
pub fn unwrap_fetched<T>(fetched: Fetched<T>) -> (T, DataSourceLabel, Option<String>) {
    match fetched {
        Ok(data) => (data, DataSourceLabel::Live, None),
        Err(Degraded { fallback, failure }) => (
            fallback,
            DataSourceLabel::Fallback,
            Some(format!("Showing sample data: {}", failure)),
        ),
    }
}

/// Provider status code to (long, short) labels. Unknown codes keep their raw
/// text as the long form and read as not started.
pub fn map_status(code: &str) -> (String, &'static str) {
    let (long, short) = match code {
        "SCHEDULED" | "TIMED" => ("Not Started", "NS"),
        "IN_PLAY" => ("In Play", "LIVE"),
        "PAUSED" => ("Halftime", "HT"),
        "FINISHED" => ("Match Finished", "FT"),
        "POSTPONED" => ("Postponed", "PP"),
        "CANCELLED" => ("Cancelled", "CANC"),
        other => return (other.to_string(), "NS"),
    };
    (long.to_string(), short)
}

pub fn placeholder_crest(name: &str, size: u32) -> String {
    let initial = name.chars().next().map(String::from).unwrap_or_else(|| "?".to_string());
    format!("https://via.placeholder.com/{size}x{size}/10b981/ffffff?text={initial}")
}

fn crest_or_placeholder(crest: Option<String>, name: &str, size: u32) -> String {
    crest
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| placeholder_crest(name, size))
}

fn score_line(line: Option<ProviderScoreLine>) -> ScoreLine {
    let line = line.unwrap_or_default();
    ScoreLine { home: line.home, away: line.away }
}

fn normalize_team(raw: ProviderTeam, country: &str) -> Team {
    let name = raw.name.or(raw.short_name).unwrap_or_else(|| "TBD".to_string());
    Team {
        id: raw.id.unwrap_or(0),
        logo: crest_or_placeholder(raw.crest, &name, TEAM_CREST_SIZE),
        name,
        country: country.to_string(),
    }
}

pub fn normalize_match(raw: ProviderMatch) -> Match {
    let country = raw
        .area
        .and_then(|area| area.name)
        .unwrap_or_else(|| UNKNOWN.to_string());

    let kickoff = DateTime::parse_from_rfc3339(&raw.utc_date)
        .map(|dt| dt.with_timezone(&Utc))
        .ok();
    if kickoff.is_none() {
        tracing::warn!("Match {} has an unparseable kickoff '{}'", raw.id, raw.utc_date);
    }

    let (long, short) = map_status(&raw.status);
    let status = MatchStatus {
        long,
        short: short.to_string(),
        elapsed: raw.minute,
    };

    let score = raw.score.and_then(|score| {
        let fulltime = score_line(score.full_time);
        fulltime.goals()?;
        status.has_started().then(|| Score {
            halftime: score_line(score.half_time),
            fulltime,
        })
    });

    let season = raw
        .season
        .as_ref()
        .and_then(|season| season.start_year())
        .or_else(|| kickoff.map(|dt| dt.year()))
        .unwrap_or_else(|| Utc::now().year());

    let competition = raw.competition;
    Match {
        id: raw.id,
        home_team: normalize_team(raw.home_team, &country),
        away_team: normalize_team(raw.away_team, &country),
        fixture: Fixture {
            date: raw.utc_date,
            timestamp: kickoff.map(|dt| dt.timestamp()).unwrap_or(0),
            timezone: "UTC".to_string(),
            venue: Venue {
                name: raw.venue.unwrap_or_else(|| "TBA".to_string()),
                city: UNKNOWN.to_string(),
            },
        },
        league: League {
            id: competition.id,
            logo: crest_or_placeholder(competition.emblem, &competition.name, LEAGUE_CREST_SIZE),
            name: competition.name,
            country,
            season,
        },
        status,
        score,
    }
}

pub fn normalize_competition(raw: ProviderCompetition) -> League {
    League {
        id: raw.id,
        logo: crest_or_placeholder(raw.emblem, &raw.name, LEAGUE_CREST_SIZE),
        country: raw
            .area
            .and_then(|area| area.name)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        season: raw
            .current_season
            .as_ref()
            .and_then(|season| season.start_year())
            .unwrap_or_else(|| Utc::now().year()),
        name: raw.name,
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, FetchFailure> {
    serde_json::from_value(value).map_err(|e| FetchFailure::Parse(e.to_string()))
}

/// Reads fixtures, leagues and results from the provider in the app's own
/// shape, substituting sample data whenever the provider lets us down.
#[derive(Clone)]
pub struct FixtureNormalizer {
    provider: Arc<dyn FootballProvider>,
    window_days: i64,
}

impl FixtureNormalizer {
    pub fn new(provider: Arc<dyn FootballProvider>, window_days: i64) -> Self {
        Self {
            provider,
            window_days: window_days.clamp(0, MAX_WINDOW_DAYS),
        }
    }

    /// Last day of the window starting at `from`, or `None` when it would run
    /// past the last representable date.
    pub fn window_end(&self, from: NaiveDate) -> Option<NaiveDate> {
        from.checked_add_signed(Duration::days(self.window_days))
    }

    /// Fixtures kicking off within the window starting at `from` (today when
    /// absent), optionally restricted to one competition.
    pub async fn fetch_fixtures(&self, league_id: Option<u64>, from: Option<NaiveDate>) -> Fetched<Vec<Match>> {
        let from = from.unwrap_or_else(|| Utc::now().date_naive());
        let Some(to) = self.window_end(from) else {
            tracing::warn!("⚠️ Fixture window from {} is out of range, serving sample data", from);
            return Err(Degraded {
                fallback: fallback_data::sample_fixtures(league_id),
                failure: FetchFailure::InvalidRequest(format!("date window from {} is out of range", from)),
            });
        };

        let endpoint = match league_id {
            Some(id) => format!("/competitions/{}/matches", id),
            None => "/matches".to_string(),
        };
        let params = vec![
            ("dateFrom".to_string(), from.format("%Y-%m-%d").to_string()),
            ("dateTo".to_string(), to.format("%Y-%m-%d").to_string()),
        ];

        let live = async {
            let value = self.provider.get_json(&endpoint, &params).await?;
            let response: ProviderMatchesResponse = decode(value)?;
            let mut matches: Vec<Match> = response.matches.into_iter().map(normalize_match).collect();
            matches.sort_by_key(|m| m.fixture.timestamp);
            Ok::<_, FetchFailure>(matches)
        };

        match live.await {
            Ok(matches) => {
                tracing::info!("✅ Fetched {} fixtures ({} to {})", matches.len(), from, to);
                Ok(matches)
            }
            Err(failure) => {
                tracing::warn!("⚠️ Error fetching fixtures, serving sample data: {}", failure);
                Err(Degraded {
                    fallback: fallback_data::sample_fixtures(league_id),
                    failure,
                })
            }
        }
    }

    pub async fn fetch_leagues(&self) -> Fetched<Vec<League>> {
        let live = async {
            let value = self.provider.get_json("/competitions", &[]).await?;
            let response: ProviderCompetitionsResponse = decode(value)?;
            Ok::<_, FetchFailure>(
                response
                    .competitions
                    .into_iter()
                    .filter(|c| c.code.as_deref().is_some_and(|code| MAJOR_COMPETITIONS.contains(&code)))
                    .map(normalize_competition)
                    .collect::<Vec<_>>(),
            )
        };

        live.await.map_err(|failure| {
            tracing::warn!("⚠️ Error fetching leagues, serving sample data: {}", failure);
            Degraded {
                fallback: fallback_data::sample_leagues(),
                failure,
            }
        })
    }

    pub async fn fetch_match_result(&self, match_id: u64) -> Fetched<Option<Match>> {
        let endpoint = format!("/matches/{}", match_id);
        let live = async {
            let value = self.provider.get_json(&endpoint, &[]).await?;
            let raw: ProviderMatch = decode(value)?;
            Ok::<_, FetchFailure>(Some(normalize_match(raw)))
        };

        live.await.map_err(|failure| {
            tracing::warn!("⚠️ Error fetching result for match {}, serving sample data: {}", match_id, failure);
            Degraded {
                fallback: fallback_data::sample_result(match_id),
                failure,
            }
        })
    }
}
