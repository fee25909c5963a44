// Per-match tooltip text: date, opponent, result and scoring breakdown.
//
// Layout:
//
//   7 Sep
//   CHE (H)
//   W 2 - 1
//   ────────────────────
//   Goal x2 (+6pts)
//   Bonus (+3pts)

use crate::lookup::CodeTables;
use crate::model::{Contribution, ContributionKind, RawMatchRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// Shown in place of the date when the record's date cannot be parsed.
pub const DATE_UNKNOWN: &str = "Date Unknown";

/// Fixed-width rule between the header and the contribution lines.
pub const SEPARATOR: &str = "────────────────────";

// ---------------------------------------------------------------------------
// Venue resolution
// ---------------------------------------------------------------------------

/// Which side of the fixture the player's club was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
    Unknown,
}

impl Side {
    /// Resolve the player's side by comparing normalized team codes.
    pub fn of(player_team: &str, m: &RawMatchRecord, tables: &CodeTables) -> Self {
        if tables.same_team(player_team, &m.home_team) {
            Side::Home
        } else if tables.same_team(player_team, &m.away_team) {
            Side::Away
        } else {
            Side::Unknown
        }
    }

    pub fn venue(&self) -> &'static str {
        match self {
            Side::Home => "(H)",
            Side::Away => "(A)",
            Side::Unknown => "",
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Build the multi-line tooltip for one match from the perspective of
/// `player_team`. Never fails: unknown dates and teams degrade to fixed text.
pub fn synthesize(m: &RawMatchRecord, player_team: &str, tables: &CodeTables) -> String {
    let date = format_match_date(&m.date).unwrap_or_else(|| DATE_UNKNOWN.to_string());

    let side = Side::of(player_team, m, tables);
    let opponent = match side {
        Side::Home => tables.team_code(&m.away_team),
        Side::Away => tables.team_code(&m.home_team),
        Side::Unknown => "Unknown".to_string(),
    };
    let fixture_line = format!("{opponent} {}", side.venue()).trim_end().to_string();

    // With the side unknown the home score is read as the player's own.
    let (own, against) = match side {
        Side::Away => (m.score.away, m.score.home),
        Side::Home | Side::Unknown => (m.score.home, m.score.away),
    };
    let result = match own.cmp(&against) {
        Ordering::Greater => 'W',
        Ordering::Less => 'L',
        Ordering::Equal => 'D',
    };
    let score_line = format!("{result} {} - {}", m.score.home, m.score.away);

    let mut lines = vec![date, fixture_line, score_line, SEPARATOR.to_string()];
    lines.extend(contribution_lines(m, tables));
    lines.join("\n")
}

/// Short display date (`"7 Sep"`). Accepts `YYYY-MM-DD`, RFC 3339 and naive
/// ISO timestamps; RFC 3339 values use the date in their own offset.
pub fn format_match_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })?;
    Some(date.format("%-d %b").to_string())
}

/// Contribution lines in display order, filtered to the ones worth showing.
///
/// Ordered by the line's points total descending, ties broken by the kind's
/// upstream name so identical input always yields identical text.
pub fn contribution_lines(m: &RawMatchRecord, tables: &CodeTables) -> Vec<String> {
    let mut entries: Vec<(ContributionKind, Contribution)> =
        m.contributions.iter().map(|(k, c)| (*k, *c)).collect();

    entries.sort_by(|(kind_a, a), (kind_b, b)| {
        b.points
            .cmp(&a.points)
            .then_with(|| kind_a.name().cmp(kind_b.name()))
    });

    entries
        .into_iter()
        .filter(|(kind, c)| c.points != 0 || kind.is_always_shown())
        .map(|(kind, c)| format_line(tables.label(kind), &c))
        .collect()
}

/// `"<Label> [x<quantity> ](<sign><points>pt[s])"`.
pub fn format_line(label: &str, c: &Contribution) -> String {
    let sign = if c.points > 0 { "+" } else { "" };
    let unit = if c.points.unsigned_abs() == 1 { "pt" } else { "pts" };
    if c.quantity > 1 {
        format!("{label} x{} ({sign}{}{unit})", c.quantity, c.points)
    } else {
        format!("{label} ({sign}{}{unit})", c.points)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
