// Canonical gameweek column set, built once per run from the whole population.

use crate::coerce::coerce_gameweek;
use crate::model::PlayerRecord;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use tracing::warn;

/// Every gameweek observed anywhere in the season.
///
/// The emitted column set is `1..=max`, so a gameweek nobody played still
/// gets a column and every player record has the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameweekIndex {
    observed: BTreeSet<u32>,
}

impl GameweekIndex {
    /// Scan every match of every player. Identifiers that fail integer
    /// coercion are dropped with a warning.
    pub fn build(players: &[PlayerRecord]) -> Self {
        let mut observed = BTreeSet::new();
        for player in players {
            for m in &player.matches {
                match coerce_gameweek(&m.gameweek) {
                    Some(gw) => {
                        observed.insert(gw);
                    }
                    None => warn!(
                        "dropping unusable gameweek '{}' for {}",
                        m.gameweek,
                        player.name.as_deref().unwrap_or("<unnamed>")
                    ),
                }
            }
        }
        Self { observed }
    }

    pub fn from_gameweeks<I: IntoIterator<Item = u32>>(gameweeks: I) -> Self {
        Self {
            observed: gameweeks.into_iter().filter(|gw| *gw > 0).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Latest gameweek seen, if any.
    pub fn max(&self) -> Option<u32> {
        self.observed.last().copied()
    }

    pub fn observed(&self) -> &BTreeSet<u32> {
        &self.observed
    }

    /// Number of emitted columns.
    pub fn len(&self) -> usize {
        self.max().unwrap_or(0) as usize
    }

    /// Column order for output: `1..=max` ascending. Empty when nothing was
    /// observed.
    pub fn columns(&self) -> RangeInclusive<u32> {
        1..=self.max().unwrap_or(0)
    }

    /// Same columns, most recent first.
    pub fn recent_first(&self) -> impl Iterator<Item = u32> {
        self.columns().rev()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
