// Per-player aggregation: lifetime and recent-window statistics plus one
// output cell per canonical gameweek.

use crate::classify::played;
use crate::coerce::{coerce_gameweek, coerce_or_default, round1, NumericField};
use crate::fixtures::UpcomingFixture;
use crate::gameweek::GameweekIndex;
use crate::lookup::CodeTables;
use crate::model::{ContributionKind, PlayerRecord, RawMatchRecord};
use crate::tooltip;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Literal emitted for a gameweek the player did not play.
pub const DNP_PLACEHOLDER: &str = "-";

/// Number of most recent matches covered by the windowed statistics.
pub const DEFAULT_RECENT_WINDOW: usize = 4;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    pub recent_window: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            recent_window: DEFAULT_RECENT_WINDOW,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Points and tooltip for a gameweek the player took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCell {
    pub points: i32,
    pub tooltip: String,
}

/// One gameweek column of an output record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameweekCell {
    NotPlayed,
    Played(MatchCell),
}

impl GameweekCell {
    /// Points shown in this column; a DNP column counts as 0.
    pub fn points(&self) -> i32 {
        match self {
            GameweekCell::NotPlayed => 0,
            GameweekCell::Played(cell) => cell.points,
        }
    }

    pub fn is_played(&self) -> bool {
        matches!(self, GameweekCell::Played(_))
    }
}

impl Serialize for GameweekCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GameweekCell::NotPlayed => serializer.serialize_str(DNP_PLACEHOLDER),
            GameweekCell::Played(cell) => cell.serialize(serializer),
        }
    }
}

/// Lifetime total for one contribution kind, over played matches only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContributionTotal {
    pub quantity: u32,
    pub points: i32,
}

impl ContributionTotal {
    /// Value for the kind's `Total …` column. Conceded goals report the
    /// accumulated deduction; everything else reports the count.
    pub fn column_value(&self, kind: ContributionKind) -> i64 {
        match kind {
            ContributionKind::ConcededGoals => i64::from(self.points),
            _ => i64::from(self.quantity),
        }
    }
}

/// One flattened, UI-ready player row.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPlayerRecord {
    pub name: String,
    pub club: String,
    pub position: String,
    pub nationality: String,
    /// Market value in millions after fallback, rounded to one decimal.
    pub value: f64,
    pub selected_percentage: f64,
    pub total_points: i32,
    pub games_played: u32,
    /// Window size N the recent statistics were computed over.
    pub recent_window: usize,
    pub recent_points: i32,
    pub recent_games_played: u32,
    pub points_per_game: f64,
    /// Recent points ÷ N, not ÷ recent games played.
    pub recent_points_per_game: f64,
    pub points_per_million: f64,
    pub recent_points_per_million: f64,
    pub contribution_totals: BTreeMap<ContributionKind, ContributionTotal>,
    /// One entry per canonical gameweek, ascending.
    pub gameweeks: Vec<(u32, GameweekCell)>,
    pub upcoming_fixtures: Vec<UpcomingFixture>,
}

impl AggregatedPlayerRecord {
    pub fn cell(&self, gameweek: u32) -> Option<&GameweekCell> {
        self.gameweeks
            .iter()
            .find(|(gw, _)| *gw == gameweek)
            .map(|(_, cell)| cell)
    }

    pub fn contribution_total(&self, kind: ContributionKind) -> ContributionTotal {
        self.contribution_totals
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    /// Sum of the points shown across all gameweek columns.
    pub fn column_points(&self) -> i64 {
        self.gameweeks
            .iter()
            .map(|(_, cell)| i64::from(cell.points()))
            .sum()
    }
}

impl Serialize for AggregatedPlayerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = self.recent_window;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("Name", &self.name)?;
        map.serialize_entry("Club", &self.club)?;
        map.serialize_entry("Position", &self.position)?;
        map.serialize_entry("Nationality", &self.nationality)?;
        map.serialize_entry("Value", &self.value)?;
        map.serialize_entry("Selected Percentage", &self.selected_percentage)?;
        map.serialize_entry("Total Points", &self.total_points)?;
        map.serialize_entry("Total Games Played", &self.games_played)?;
        map.serialize_entry(&format!("Total Over {n} Gameweeks"), &self.recent_points)?;
        map.serialize_entry(
            &format!("Games Played Over {n} Gameweeks"),
            &self.recent_games_played,
        )?;
        map.serialize_entry("Points Per Game", &self.points_per_game)?;
        map.serialize_entry(
            &format!("Points Per Game Over {n} Gameweeks"),
            &self.recent_points_per_game,
        )?;
        map.serialize_entry("Points Per Million", &self.points_per_million)?;
        map.serialize_entry(
            &format!("Points Per Million Over {n} Gameweeks"),
            &self.recent_points_per_million,
        )?;
        for kind in ContributionKind::ALL {
            map.serialize_entry(
                kind.total_column(),
                &self.contribution_total(kind).column_value(kind),
            )?;
        }
        for (gw, cell) in &self.gameweeks {
            map.serialize_entry(&gw.to_string(), cell)?;
        }
        map.serialize_entry("upcoming_fixtures", &self.upcoming_fixtures)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

/// Running state for the single descending walk over a player's matches.
struct Accumulator {
    window: usize,
    cells: BTreeMap<u32, MatchCell>,
    total_points: i32,
    games_played: u32,
    recent_points: i32,
    recent_games_played: u32,
    contributions: BTreeMap<ContributionKind, ContributionTotal>,
}

impl Accumulator {
    fn new(window: usize) -> Self {
        Self {
            window,
            cells: BTreeMap::new(),
            total_points: 0,
            games_played: 0,
            recent_points: 0,
            recent_games_played: 0,
            contributions: ContributionKind::ALL
                .into_iter()
                .map(|kind| (kind, ContributionTotal::default()))
                .collect(),
        }
    }

    /// Fold in the match at `walk_position` (0 = most recent). Matches that
    /// were not played still use up a window slot but add nothing.
    fn record(&mut self, walk_position: usize, gameweek: u32, m: &RawMatchRecord, tooltip: String) {
        let in_window = walk_position < self.window;

        self.total_points = self.total_points.saturating_add(m.total_points);
        self.games_played = self.games_played.saturating_add(1);
        if in_window {
            self.recent_points = self.recent_points.saturating_add(m.total_points);
            self.recent_games_played = self.recent_games_played.saturating_add(1);
        }

        for (kind, c) in &m.contributions {
            let total = self.contributions.entry(*kind).or_default();
            total.quantity = total.quantity.saturating_add(c.quantity);
            total.points = total.points.saturating_add(c.points);
        }

        // Two appearances in one gameweek share a single column.
        self.cells
            .entry(gameweek)
            .and_modify(|cell| {
                cell.points = cell.points.saturating_add(m.total_points);
                cell.tooltip.push_str("\n\n");
                cell.tooltip.push_str(&tooltip);
            })
            .or_insert_with(|| MatchCell {
                points: m.total_points,
                tooltip: tooltip.clone(),
            });
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate one player against the canonical gameweek index.
///
/// Returns `None` for players without a usable name. Malformed fields never
/// fail the player: bad numerics fall back to their defaults and matches with
/// an unusable gameweek are dropped.
pub fn aggregate_player(
    player: &PlayerRecord,
    index: &GameweekIndex,
    tables: &CodeTables,
    options: &AggregateOptions,
) -> Option<AggregatedPlayerRecord> {
    let Some(name) = player
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    else {
        debug!("skipping player record without a name");
        return None;
    };

    let club = tables.team_code(&player.club);
    let position = tables.position_code(&player.position);
    let value = coerce_or_default(player.value.as_ref(), NumericField::MarketValue);
    let selected_percentage = coerce_or_default(
        player.selected_percentage.as_ref(),
        NumericField::SelectedPercentage,
    );

    // Most recent first; the stable sort keeps input order within a gameweek.
    let mut walk: Vec<(u32, &RawMatchRecord)> = player
        .matches
        .iter()
        .filter_map(|m| match coerce_gameweek(&m.gameweek) {
            Some(gw) => Some((gw, m)),
            None => {
                warn!("{name}: dropping match with unusable gameweek '{}'", m.gameweek);
                None
            }
        })
        .collect();
    walk.sort_by(|a, b| b.0.cmp(&a.0));

    let window = options.recent_window;
    let mut acc = Accumulator::new(window);
    for (walk_position, (gameweek, m)) in walk.iter().enumerate() {
        if !played(m) {
            continue;
        }
        let tooltip = tooltip::synthesize(m, &player.club, tables);
        acc.record(walk_position, *gameweek, m, tooltip);
    }

    let gameweeks: Vec<(u32, GameweekCell)> = index
        .columns()
        .map(|gw| {
            let cell = match acc.cells.remove(&gw) {
                Some(cell) => GameweekCell::Played(cell),
                None => GameweekCell::NotPlayed,
            };
            (gw, cell)
        })
        .collect();
    if !acc.cells.is_empty() {
        warn!(
            "{name}: {} played gameweek(s) fall outside the season index",
            acc.cells.len()
        );
    }

    let total = f64::from(acc.total_points);
    let recent = f64::from(acc.recent_points);
    let points_per_game = if acc.games_played > 0 {
        total / f64::from(acc.games_played)
    } else {
        0.0
    };
    let recent_points_per_game = if window > 0 {
        recent / window as f64
    } else {
        0.0
    };

    debug!(
        "{name}: {} points from {} games ({} matches listed)",
        acc.total_points,
        acc.games_played,
        walk.len()
    );

    Some(AggregatedPlayerRecord {
        name: name.to_string(),
        club,
        position,
        nationality: player.nationality.trim().to_string(),
        value: round1(value),
        selected_percentage: round1(selected_percentage),
        total_points: acc.total_points,
        games_played: acc.games_played,
        recent_window: window,
        recent_points: acc.recent_points,
        recent_games_played: acc.recent_games_played,
        points_per_game: round1(points_per_game),
        recent_points_per_game: round1(recent_points_per_game),
        points_per_million: round1(total / value),
        recent_points_per_million: round1(recent / value),
        contribution_totals: acc.contributions,
        gameweeks,
        upcoming_fixtures: Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
