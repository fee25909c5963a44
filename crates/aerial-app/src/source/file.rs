// Scraped data.json reader and optional fixtures file.

use std::collections::BTreeMap;
use std::path::Path;

use aerial_core::{
    Contribution, ContributionKind, FixtureMap, PlayerRecord, RawGameweek, RawMatchRecord,
    RawNumber, Score,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::SourceError;

/// Placeholder the scraper writes for fields it could not find.
const MISSING: &str = "N/A";

// ---------------------------------------------------------------------------
// Raw scraped structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScrapedPlayer {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "Position", default)]
    position: Option<String>,
    #[serde(rename = "Nationality", default)]
    nationality: Option<String>,
    #[serde(rename = "Selected_Percentage", default)]
    selected_percentage: Option<RawNumber>,
    #[serde(rename = "Value", default)]
    value: Option<RawNumber>,
    #[serde(rename = "Match_Results", default)]
    match_results: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ScrapedMatch {
    #[serde(default)]
    home_team: Option<String>,
    #[serde(default)]
    away_team: Option<String>,
    #[serde(default)]
    gameweek: Option<RawGameweek>,
    #[serde(default)]
    total_points: Option<i32>,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    contributions: Option<BTreeMap<String, Contribution>>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

async fn read(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Read the scraper's player array from `path`.
pub async fn load_players(path: &Path) -> Result<Vec<PlayerRecord>, SourceError> {
    let text = read(path).await?;
    parse_players(&text).map_err(|source| SourceError::Json {
        context: path.display().to_string(),
        source,
    })
}

/// Read a club id → upcoming fixtures map from `path`. Club keys are
/// uppercased.
pub async fn load_fixtures(path: &Path) -> Result<FixtureMap, SourceError> {
    let text = read(path).await?;
    let map: FixtureMap = serde_json::from_str(&text).map_err(|source| SourceError::Json {
        context: path.display().to_string(),
        source,
    })?;
    Ok(map
        .into_iter()
        .map(|(club, fixtures)| (club.trim().to_uppercase(), fixtures))
        .collect())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a scraped `data.json` document. The document must be a JSON array;
/// individual malformed players and matches are skipped with a warning.
pub fn parse_players(text: &str) -> Result<Vec<PlayerRecord>, serde_json::Error> {
    let raw: Vec<Value> = serde_json::from_str(text)?;
    let mut players = Vec::with_capacity(raw.len());
    for (i, item) in raw.into_iter().enumerate() {
        match serde_json::from_value::<ScrapedPlayer>(item) {
            Ok(p) => players.push(into_player_record(p)),
            Err(e) => warn!("skipping malformed player entry #{i}: {e}"),
        }
    }
    Ok(players)
}

fn into_player_record(p: ScrapedPlayer) -> PlayerRecord {
    let label = p.name.clone().unwrap_or_else(|| "<unnamed>".into());

    let matches = p
        .match_results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|m| match serde_json::from_value::<ScrapedMatch>(m) {
            Ok(m) => Some(into_match_record(m, &label)),
            Err(e) => {
                warn!("{label}: skipping malformed match entry: {e}");
                None
            }
        })
        .collect();

    PlayerRecord {
        name: p.name,
        club: present(p.team),
        position: present(p.position),
        nationality: present(p.nationality),
        value: p.value,
        selected_percentage: p.selected_percentage,
        matches,
    }
}

fn into_match_record(m: ScrapedMatch, player: &str) -> RawMatchRecord {
    let score_text = m.score.unwrap_or_default();
    let score = parse_score(&score_text).unwrap_or_else(|| {
        if !score_text.trim().is_empty() {
            warn!("{player}: unparseable score '{score_text}', using 0 - 0");
        }
        Score::default()
    });

    let mut contributions = BTreeMap::new();
    for (name, c) in m.contributions.unwrap_or_default() {
        match scraped_kind(&name) {
            Some(kind) => {
                let entry: &mut Contribution = contributions.entry(kind).or_default();
                entry.quantity += c.quantity;
                entry.points += c.points;
            }
            None => warn!("{player}: dropping unknown contribution '{name}'"),
        }
    }

    RawMatchRecord {
        gameweek: m.gameweek.unwrap_or_default(),
        total_points: m.total_points.unwrap_or(0),
        home_team: present(m.home_team),
        away_team: present(m.away_team),
        score,
        date: m.date.unwrap_or_default(),
        contributions,
    }
}

/// Contribution kind for a scraped key. Older scrapes used `Saves` for
/// `ThreeSaves`.
fn scraped_kind(name: &str) -> Option<ContributionKind> {
    match name.trim() {
        "Saves" => Some(ContributionKind::ThreeSaves),
        other => ContributionKind::from_name(other),
    }
}

/// Parse `"<home> - <away>"`.
pub fn parse_score(s: &str) -> Option<Score> {
    let (home, away) = s.split_once('-')?;
    Some(Score::new(
        home.trim().parse().ok()?,
        away.trim().parse().ok()?,
    ))
}

fn present(value: Option<String>) -> String {
    match value {
        Some(v) if v.trim() != MISSING => v,
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
