// GraphQL client for the fantasy API.
//
// Sends the players and fixtures queries and maps the responses onto the core
// input model. Response parsing is split into pure `parse_*` functions so it
// can be tested without a server. Individual malformed players, games and
// contributions are skipped with a warning; only transport failures and
// GraphQL-level errors fail a fetch.

use std::collections::BTreeMap;
use std::time::Duration;

use aerial_core::{
    Contribution, ContributionKind, FixtureMap, PlayerRecord, RawGameweek, RawMatchRecord,
    RawNumber, Score, UpcomingFixture,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::SourceError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_API_URL: &str = "https://api.aerialfantasy.co/graphql";

pub const PLAYERS_QUERY: &str = r#"{
  players {
    slug
    firstName
    lastName
    club { id shortName }
    position
    nationality
    price
    totalPoints
    selected
    performanceV2 {
      games {
        game { id scheduledAt stage { id } home { score } away { score } }
        points
        contributions { contribution quantity individualPoints }
      }
    }
  }
}"#;

pub const FIXTURES_QUERY: &str = r#"{
  clubs {
    id
    name
    games {
      id
      scheduledAt
      hasStarted
      stage { id }
      home { party { __typename ... on Club { name shortName id } } }
      away { party { __typename ... on Club { name shortName id } } }
    }
  }
}"#;

// ---------------------------------------------------------------------------
// GraphQlClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    url: String,
}

impl GraphQlClient {
    /// Create a client for `url` with a per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::Http {
                url: url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_players(&self) -> Result<Vec<PlayerRecord>, SourceError> {
        let data = self.query(PLAYERS_QUERY).await?;
        parse_players(data)
    }

    pub async fn fetch_fixtures(&self) -> Result<FixtureMap, SourceError> {
        let data = self.query(FIXTURES_QUERY).await?;
        parse_fixtures(data)
    }

    /// POST a query and return the `data` member of the response.
    async fn query(&self, query: &str) -> Result<Value, SourceError> {
        let http_err = |source| SourceError::Http {
            url: self.url.clone(),
            source,
        };

        debug!("POST {} ({} byte query)", self.url, query.len());
        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?;
        let body = response.text().await.map_err(http_err)?;
        parse_envelope(&body)
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorItem>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorItem {
    #[serde(default)]
    message: String,
}

/// Unwrap a GraphQL response body to its `data` member. A non-empty `errors`
/// array is an error even when partial data is present.
pub fn parse_envelope(body: &str) -> Result<Value, SourceError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|source| SourceError::Json {
        context: "GraphQL response".into(),
        source,
    })?;

    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SourceError::GraphQl { message });
    }

    envelope.data.ok_or_else(|| SourceError::GraphQl {
        message: "response has no data".into(),
    })
}

/// Deserialize each element on its own so one bad item does not sink the rest.
fn parse_each<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("skipping malformed {what}: {e}");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PlayersData {
    #[serde(default)]
    players: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPlayer {
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    club: Option<ApiClubRef>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    selected: Option<f64>,
    #[serde(default, rename = "performanceV2")]
    performance: Option<OneOrMany<ApiPerformance>>,
}

#[derive(Debug, Deserialize)]
struct ApiClubRef {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiPerformance {
    #[serde(default)]
    games: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiGamePerformance {
    game: ApiGame,
    #[serde(default)]
    points: Option<i32>,
    #[serde(default)]
    contributions: Option<Vec<ApiContribution>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGame {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    scheduled_at: Option<String>,
    #[serde(default)]
    stage: Option<ApiStage>,
    #[serde(default)]
    home: Option<ApiScore>,
    #[serde(default)]
    away: Option<ApiScore>,
}

#[derive(Debug, Deserialize)]
struct ApiStage {
    id: Option<RawGameweek>,
}

#[derive(Debug, Deserialize)]
struct ApiScore {
    #[serde(default)]
    score: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiContribution {
    contribution: String,
    #[serde(default)]
    quantity: Option<u32>,
    #[serde(default)]
    individual_points: Option<i32>,
}

/// Map the `data` member of a players response onto core player records.
pub fn parse_players(data: Value) -> Result<Vec<PlayerRecord>, SourceError> {
    let data: PlayersData = serde_json::from_value(data).map_err(|source| SourceError::Json {
        context: "players response".into(),
        source,
    })?;
    let raw = data.players.unwrap_or_default();
    let players: Vec<ApiPlayer> = parse_each(raw, "player");
    Ok(players.into_iter().map(into_player_record).collect())
}

fn into_player_record(p: ApiPlayer) -> PlayerRecord {
    let name = format!(
        "{} {}",
        p.first_name.as_deref().unwrap_or(""),
        p.last_name.as_deref().unwrap_or("")
    )
    .trim()
    .to_string();
    let label = if name.is_empty() {
        p.slug.clone().unwrap_or_else(|| "<unnamed>".into())
    } else {
        name.clone()
    };

    let matches = p
        .performance
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|perf| perf.games.unwrap_or_default())
        .collect::<Vec<_>>();
    let games: Vec<ApiGamePerformance> = parse_each(matches, &format!("game for {label}"));

    PlayerRecord {
        name: (!name.is_empty()).then_some(name),
        club: p
            .club
            .and_then(|c| c.id)
            .map(|id| id.trim().to_uppercase())
            .unwrap_or_default(),
        position: p.position.unwrap_or_default(),
        nationality: p.nationality.unwrap_or_default(),
        // Prices are published in tenths of a million.
        value: p.price.map(|price| RawNumber::Number(price / 10.0)),
        // Selection is published as a fraction.
        selected_percentage: p.selected.map(|s| RawNumber::Number(s * 100.0)),
        matches: games
            .into_iter()
            .map(|g| into_match_record(g, &label))
            .collect(),
    }
}

fn into_match_record(g: ApiGamePerformance, player: &str) -> RawMatchRecord {
    let game = g.game;
    let (home_team, away_team) = teams_from_game_id(game.id.as_deref().unwrap_or(""));

    let mut contributions: BTreeMap<ContributionKind, Contribution> = BTreeMap::new();
    for c in g.contributions.unwrap_or_default() {
        let Some(kind) = ContributionKind::from_name(&c.contribution) else {
            warn!("{player}: dropping unknown contribution '{}'", c.contribution);
            continue;
        };
        let quantity = c.quantity.unwrap_or(1);
        let points = i32::try_from(quantity)
            .unwrap_or(i32::MAX)
            .saturating_mul(c.individual_points.unwrap_or(0));
        let entry = contributions.entry(kind).or_default();
        entry.quantity += quantity;
        entry.points += points;
    }

    RawMatchRecord {
        gameweek: game.stage.and_then(|s| s.id).unwrap_or_default(),
        total_points: g.points.unwrap_or(0),
        home_team,
        away_team,
        score: Score::new(
            game.home.and_then(|s| s.score).unwrap_or(0),
            game.away.and_then(|s| s.score).unwrap_or(0),
        ),
        date: game.scheduled_at.unwrap_or_default(),
        contributions,
    }
}

/// Home and away codes embedded in a game id: the first and last three
/// characters, uppercased. Ids shorter than six characters carry neither.
pub fn teams_from_game_id(id: &str) -> (String, String) {
    let chars: Vec<char> = id.trim().chars().collect();
    if chars.len() < 6 {
        return (String::new(), String::new());
    }
    let home: String = chars[..3].iter().collect();
    let away: String = chars[chars.len() - 3..].iter().collect();
    (home.to_uppercase(), away.to_uppercase())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FixturesData {
    #[serde(default)]
    clubs: Option<Vec<ApiClub>>,
}

#[derive(Debug, Deserialize)]
struct ApiClub {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    games: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFixture {
    scheduled_at: String,
    #[serde(default)]
    stage: Option<ApiStage>,
    home: ApiFixtureSide,
    away: ApiFixtureSide,
}

#[derive(Debug, Deserialize)]
struct ApiFixtureSide {
    party: ApiParty,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiParty {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    short_name: String,
}

/// Map the `data` member of a fixtures response to club id → games that have
/// not started yet.
pub fn parse_fixtures(data: Value) -> Result<FixtureMap, SourceError> {
    let data: FixturesData = serde_json::from_value(data).map_err(|source| SourceError::Json {
        context: "fixtures response".into(),
        source,
    })?;

    let mut map = FixtureMap::new();
    for club in data.clubs.unwrap_or_default() {
        let Some(club_id) = club.id.map(|id| id.trim().to_uppercase()) else {
            warn!("skipping club without an id in fixtures response");
            continue;
        };

        let upcoming: Vec<Value> = club
            .games
            .unwrap_or_default()
            .into_iter()
            .filter(|g| g.get("hasStarted").and_then(Value::as_bool) == Some(false))
            .collect();
        let games: Vec<ApiFixture> = parse_each(upcoming, &format!("fixture for {club_id}"));

        let fixtures = games
            .into_iter()
            .filter_map(|g| match into_fixture(g) {
                Some(f) => Some(f),
                None => {
                    warn!("{club_id}: skipping fixture with unparseable kick-off time");
                    None
                }
            })
            .collect();
        map.insert(club_id, fixtures);
    }
    Ok(map)
}

fn into_fixture(g: ApiFixture) -> Option<UpcomingFixture> {
    let kick_off = DateTime::parse_from_rfc3339(g.scheduled_at.trim())
        .ok()?
        .with_timezone(&Utc);
    Some(UpcomingFixture {
        date: kick_off.format("%-d %b").to_string(),
        time: kick_off.format("%H:%M").to_string(),
        gameweek: g
            .stage
            .and_then(|s| s.id)
            .map(|id| id.to_string())
            .unwrap_or_default(),
        home_id: g.home.party.id.trim().to_uppercase(),
        home_name: g.home.party.name,
        home_short_name: g.home.party.short_name,
        away_id: g.away.party.id.trim().to_uppercase(),
        away_name: g.away.party.name,
        away_short_name: g.away.party.short_name,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
