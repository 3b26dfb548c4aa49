// Static sample data served whenever the upstream provider cannot be used.
// Ids are football-data.org ids so that live league ids select sample fixtures.
use crate::models::football::{Fixture, League, Match, MatchStatus, Score, ScoreLine, Team, Venue};

const SEASON: i32 = 2024;

struct SampleMatch {
    id: u64,
    home: (u64, &'static str),
    away: (u64, &'static str),
    country: &'static str,
    date: &'static str,
    timestamp: i64,
    venue: &'static str,
    city: &'static str,
    league: u64,
}

// (id, code, name, country)
const LEAGUES: [(u64, &str, &str, &str); 5] = [
    (2021, "PL", "Premier League", "England"),
    (2014, "PD", "La Liga", "Spain"),
    (2002, "BL1", "Bundesliga", "Germany"),
    (2019, "SA", "Serie A", "Italy"),
    (2015, "FL1", "Ligue 1", "France"),
];

const MATCHES: [SampleMatch; 5] = [
    SampleMatch {
        id: 1,
        home: (66, "Manchester United"),
        away: (64, "Liverpool"),
        country: "England",
        date: "2025-01-15T15:00:00Z",
        timestamp: 1736953200,
        venue: "Old Trafford",
        city: "Manchester",
        league: 2021,
    },
    SampleMatch {
        id: 2,
        home: (81, "Barcelona"),
        away: (86, "Real Madrid"),
        country: "Spain",
        date: "2025-01-16T20:00:00Z",
        timestamp: 1737057600,
        venue: "Camp Nou",
        city: "Barcelona",
        league: 2014,
    },
    SampleMatch {
        id: 3,
        home: (5, "Bayern Munich"),
        away: (4, "Borussia Dortmund"),
        country: "Germany",
        date: "2025-01-17T18:30:00Z",
        timestamp: 1737138600,
        venue: "Allianz Arena",
        city: "Munich",
        league: 2002,
    },
    SampleMatch {
        id: 4,
        home: (109, "Juventus"),
        away: (98, "AC Milan"),
        country: "Italy",
        date: "2025-01-18T19:45:00Z",
        timestamp: 1737229500,
        venue: "Allianz Stadium",
        city: "Turin",
        league: 2019,
    },
    SampleMatch {
        id: 5,
        home: (524, "Paris Saint Germain"),
        away: (521, "Lille"),
        country: "France",
        date: "2025-01-19T20:00:00Z",
        timestamp: 1737316800,
        venue: "Parc des Princes",
        city: "Paris",
        league: 2015,
    },
];

fn team_logo(id: u64) -> String {
    format!("https://crests.football-data.org/{}.png", id)
}

fn league_logo(code: &str) -> String {
    format!("https://crests.football-data.org/{}.png", code)
}

fn league(id: u64) -> League {
    let (id, code, name, country) = LEAGUES
        .iter()
        .copied()
        .find(|(league_id, _, _, _)| *league_id == id)
        .unwrap_or((id, "", "Unknown", "Unknown"));
    League {
        id,
        name: name.to_string(),
        country: country.to_string(),
        logo: league_logo(code),
        season: SEASON,
    }
}

fn team((id, name): (u64, &str), country: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        logo: team_logo(id),
        country: country.to_string(),
    }
}

fn build(sample: &SampleMatch) -> Match {
    Match {
        id: sample.id,
        home_team: team(sample.home, sample.country),
        away_team: team(sample.away, sample.country),
        fixture: Fixture {
            date: sample.date.to_string(),
            timestamp: sample.timestamp,
            timezone: "UTC".to_string(),
            venue: Venue {
                name: sample.venue.to_string(),
                city: sample.city.to_string(),
            },
        },
        league: league(sample.league),
        status: MatchStatus::not_started(),
        score: None,
    }
}

pub fn sample_leagues() -> Vec<League> {
    LEAGUES.iter().map(|(id, _, _, _)| league(*id)).collect()
}

pub fn sample_matches() -> Vec<Match> {
    MATCHES.iter().map(build).collect()
}

pub fn sample_fixtures(league_id: Option<u64>) -> Vec<Match> {
    sample_matches()
        .into_iter()
        .filter(|m| league_id.map_or(true, |id| m.league.id == id))
        .collect()
}

/// The sample match with a fixed final result (HT 1-0, FT 2-1).
pub fn sample_result(match_id: u64) -> Option<Match> {
    let mut finished = sample_matches().into_iter().find(|m| m.id == match_id)?;
    finished.status = MatchStatus {
        long: "Match Finished".to_string(),
        short: "FT".to_string(),
        elapsed: Some(90),
    };
    finished.score = Some(Score {
        halftime: ScoreLine::new(1, 0),
        fulltime: ScoreLine::new(2, 1),
    });
    Some(finished)
}
