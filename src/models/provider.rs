// Payload schemas of the football-data.org v4 API. Every field the provider
// may leave out is optional here so that defaults are applied in one place,
// the fixture normalizer.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProviderMatchesResponse {
    #[serde(default)]
    pub matches: Vec<ProviderMatch>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderCompetitionsResponse {
    #[serde(default)]
    pub competitions: Vec<ProviderCompetition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMatch {
    pub id: u64,
    pub utc_date: String,
    pub status: String,
    #[serde(default)]
    pub minute: Option<u32>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub area: Option<ProviderArea>,
    pub competition: ProviderCompetitionRef,
    #[serde(default)]
    pub season: Option<ProviderSeason>,
    pub home_team: ProviderTeam,
    pub away_team: ProviderTeam,
    #[serde(default)]
    pub score: Option<ProviderScore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTeam {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub crest: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderArea {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderCompetitionRef {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub emblem: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCompetition {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub emblem: Option<String>,
    #[serde(default)]
    pub area: Option<ProviderArea>,
    #[serde(default)]
    pub current_season: Option<ProviderSeason>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSeason {
    #[serde(default)]
    pub start_date: Option<String>,
}

impl ProviderSeason {
    pub fn start_year(&self) -> Option<i32> {
        self.start_date.as_deref()?.get(0..4)?.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderScore {
    #[serde(default)]
    pub full_time: Option<ProviderScoreLine>,
    #[serde(default)]
    pub half_time: Option<ProviderScoreLine>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ProviderScoreLine {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}
