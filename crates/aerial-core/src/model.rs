// Input data model: players and the raw per-match records attached to them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Contribution kinds
// ---------------------------------------------------------------------------

/// A scored event category within a single match.
///
/// Variant order is the column order used for the per-contribution totals in
/// the aggregated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContributionKind {
    Scored,
    Assisted,
    CleanSheet,
    Bonus,
    ThreeSaves,
    GoalLineClearance,
    MissedPenalty,
    ReceivedRedCard,
    ReceivedYellowCard,
    ScoredOwnGoal,
    ConcededGoals,
    PlayedOneMinute,
    PlayedSixtyMinutes,
}

impl ContributionKind {
    pub const ALL: [ContributionKind; 13] = [
        ContributionKind::Scored,
        ContributionKind::Assisted,
        ContributionKind::CleanSheet,
        ContributionKind::Bonus,
        ContributionKind::ThreeSaves,
        ContributionKind::GoalLineClearance,
        ContributionKind::MissedPenalty,
        ContributionKind::ReceivedRedCard,
        ContributionKind::ReceivedYellowCard,
        ContributionKind::ScoredOwnGoal,
        ContributionKind::ConcededGoals,
        ContributionKind::PlayedOneMinute,
        ContributionKind::PlayedSixtyMinutes,
    ];

    /// The upstream identifier for this kind (also the tooltip tie-break key).
    pub fn name(&self) -> &'static str {
        match self {
            ContributionKind::Scored => "Scored",
            ContributionKind::Assisted => "Assisted",
            ContributionKind::CleanSheet => "CleanSheet",
            ContributionKind::Bonus => "Bonus",
            ContributionKind::ThreeSaves => "ThreeSaves",
            ContributionKind::GoalLineClearance => "GoalLineClearance",
            ContributionKind::MissedPenalty => "MissedPenalty",
            ContributionKind::ReceivedRedCard => "ReceivedRedCard",
            ContributionKind::ReceivedYellowCard => "ReceivedYellowCard",
            ContributionKind::ScoredOwnGoal => "ScoredOwnGoal",
            ContributionKind::ConcededGoals => "ConcededGoals",
            ContributionKind::PlayedOneMinute => "PlayedOneMinute",
            ContributionKind::PlayedSixtyMinutes => "PlayedSixtyMinutes",
        }
    }

    /// Parse an upstream identifier. Surrounding whitespace is ignored; the
    /// comparison is otherwise exact.
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|kind| kind.name() == s)
    }

    /// Built-in tooltip label, used when the label table has no override.
    pub fn default_label(&self) -> &'static str {
        match self {
            ContributionKind::Scored => "Goal",
            ContributionKind::Assisted => "Assist",
            ContributionKind::CleanSheet => "Clean Sheet",
            ContributionKind::Bonus => "Bonus",
            ContributionKind::ThreeSaves => "Saves",
            ContributionKind::GoalLineClearance => "Clearance",
            ContributionKind::MissedPenalty => "Missed Pen",
            ContributionKind::ReceivedRedCard => "Red Card",
            ContributionKind::ReceivedYellowCard => "Yellow Card",
            ContributionKind::ScoredOwnGoal => "Own Goal",
            ContributionKind::ConcededGoals => "Conceded",
            ContributionKind::PlayedOneMinute => "1 min",
            ContributionKind::PlayedSixtyMinutes => "60 min",
        }
    }

    /// Output column holding the lifetime total for this kind. Keys match
    /// the ones the league table front end reads, spelling included.
    pub fn total_column(&self) -> &'static str {
        match self {
            ContributionKind::Scored => "Total Goals",
            ContributionKind::Assisted => "Total Assists",
            ContributionKind::CleanSheet => "Total Clean Sheet",
            ContributionKind::Bonus => "Total Bonus Points",
            ContributionKind::ThreeSaves => "Total Saves",
            ContributionKind::GoalLineClearance => "Total Clearances",
            ContributionKind::MissedPenalty => "Total Missed Penalties",
            ContributionKind::ReceivedRedCard => "Total Red Cards",
            ContributionKind::ReceivedYellowCard => "Total Yellow Cards",
            ContributionKind::ScoredOwnGoal => "Total Own Goals",
            ContributionKind::ConcededGoals => "Total Conceeded",
            ContributionKind::PlayedOneMinute => "Total 1 min Appearances",
            ContributionKind::PlayedSixtyMinutes => "Total 60 min Appearances",
        }
    }

    /// Events listed in a tooltip even when they carry no point impact.
    pub fn is_always_shown(&self) -> bool {
        matches!(
            self,
            ContributionKind::ReceivedRedCard
                | ContributionKind::ReceivedYellowCard
                | ContributionKind::MissedPenalty
                | ContributionKind::ScoredOwnGoal
        )
    }

    /// Whether this kind records time on the pitch.
    pub fn is_minutes_marker(&self) -> bool {
        matches!(
            self,
            ContributionKind::PlayedOneMinute | ContributionKind::PlayedSixtyMinutes
        )
    }
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quantity and point impact of one contribution kind within one match.
///
/// `points` is the total for the match, not a per-unit rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub points: i32,
}

impl Contribution {
    pub fn new(quantity: u32, points: i32) -> Self {
        Self { quantity, points }
    }
}

// ---------------------------------------------------------------------------
// Loosely typed scalars
// ---------------------------------------------------------------------------

/// A gameweek identifier as delivered upstream: a number or an
/// integer-like string such as `"7"` or `"GW7"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawGameweek {
    Number(i64),
    Text(String),
}

impl Default for RawGameweek {
    fn default() -> Self {
        RawGameweek::Text(String::new())
    }
}

impl From<u32> for RawGameweek {
    fn from(gw: u32) -> Self {
        RawGameweek::Number(i64::from(gw))
    }
}

impl From<&str> for RawGameweek {
    fn from(s: &str) -> Self {
        RawGameweek::Text(s.to_string())
    }
}

impl fmt::Display for RawGameweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawGameweek::Number(n) => write!(f, "{n}"),
            RawGameweek::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A numeric field that may arrive as a number or as decorated text
/// (`"9.5m"`, `"12.3%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        RawNumber::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Match and player records
// ---------------------------------------------------------------------------

/// Final score of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }
}

/// One match a player appeared in (or was listed for).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMatchRecord {
    pub gameweek: RawGameweek,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub score: Score,
    /// Kick-off date as text; parsed only when the tooltip is built.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub contributions: BTreeMap<ContributionKind, Contribution>,
}

impl RawMatchRecord {
    pub fn contribution(&self, kind: ContributionKind) -> Option<&Contribution> {
        self.contributions.get(&kind)
    }

    /// Quantity recorded for `kind`, or 0 when absent.
    pub fn quantity(&self, kind: ContributionKind) -> u32 {
        self.contribution(kind).map(|c| c.quantity).unwrap_or(0)
    }
}

/// One player and every match record the source found for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Records without a usable name are dropped by the aggregator.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub nationality: String,
    /// Market value in millions.
    #[serde(default)]
    pub value: Option<RawNumber>,
    #[serde(default)]
    pub selected_percentage: Option<RawNumber>,
    #[serde(default)]
    pub matches: Vec<RawMatchRecord>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contribution_kind_names_roundtrip() {
        for kind in ContributionKind::ALL {
            assert_eq!(ContributionKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(
            ContributionKind::from_name("  Scored "),
            Some(ContributionKind::Scored)
        );
        assert_eq!(ContributionKind::from_name("Saves"), None);
        assert_eq!(ContributionKind::from_name("scored"), None);
    }

    #[test]
    fn total_columns_are_unique() {
        let mut columns: Vec<&str> = ContributionKind::ALL
            .iter()
            .map(|k| k.total_column())
            .collect();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), ContributionKind::ALL.len());
    }

    #[test]
    fn conceded_column_keeps_front_end_key() {
        assert_eq!(
            ContributionKind::ConcededGoals.total_column(),
            "Total Conceeded"
        );
        assert_eq!(ContributionKind::Scored.total_column(), "Total Goals");
    }

    #[test]
    fn always_shown_kinds() {
        let shown: Vec<ContributionKind> = ContributionKind::ALL
            .into_iter()
            .filter(|k| k.is_always_shown())
            .collect();
        assert_eq!(
            shown,
            vec![
                ContributionKind::MissedPenalty,
                ContributionKind::ReceivedRedCard,
                ContributionKind::ReceivedYellowCard,
                ContributionKind::ScoredOwnGoal,
            ]
        );
    }

    #[test]
    fn match_record_deserializes_from_json() {
        let json = r#"{
            "gameweek": "5",
            "total_points": 7,
            "home_team": "Arsenal",
            "away_team": "Chelsea",
            "score": { "home": 2, "away": 1 },
            "date": "2025-09-07",
            "contributions": {
                "Scored": { "quantity": 1, "points": 5 },
                "PlayedSixtyMinutes": { "quantity": 1, "points": 2 }
            }
        }"#;
        let record: RawMatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.gameweek, RawGameweek::Text("5".into()));
        assert_eq!(record.total_points, 7);
        assert_eq!(record.score, Score::new(2, 1));
        assert_eq!(record.quantity(ContributionKind::Scored), 1);
        assert_eq!(record.quantity(ContributionKind::Assisted), 0);
    }

    #[test]
    fn raw_numbers_accept_numbers_and_text() {
        let v: RawNumber = serde_json::from_str("9.5").unwrap();
        assert_eq!(v, RawNumber::Number(9.5));
        let v: RawNumber = serde_json::from_str("\"9.5m\"").unwrap();
        assert_eq!(v, RawNumber::Text("9.5m".into()));
        let gw: RawGameweek = serde_json::from_str("12").unwrap();
        assert_eq!(gw, RawGameweek::Number(12));
        assert_eq!(gw.to_string(), "12");
    }
}
