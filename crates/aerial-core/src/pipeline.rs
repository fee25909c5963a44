// Whole-population run: index first, then players fanned out in parallel.

use crate::aggregate::{aggregate_player, AggregateOptions, AggregatedPlayerRecord};
use crate::fixtures::{self, FixtureMap};
use crate::gameweek::GameweekIndex;
use crate::lookup::CodeTables;
use crate::model::PlayerRecord;
use rayon::prelude::*;
use tracing::info;

/// Diagnostic counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub players_in: usize,
    pub emitted: usize,
    pub skipped_unnamed: usize,
    pub gameweek_columns: usize,
    pub recent_window: usize,
}

/// Result of [`aggregate_population`].
#[derive(Debug, Clone)]
pub struct AggregationRun {
    pub index: GameweekIndex,
    /// Output rows in input order.
    pub records: Vec<AggregatedPlayerRecord>,
    pub summary: RunSummary,
}

/// Map the raw population to output records.
///
/// The gameweek index is fully built before any player is aggregated. Players
/// share no mutable state, so they are processed on the rayon pool; the
/// indexed collect keeps output in input order.
pub fn aggregate_population(
    players: &[PlayerRecord],
    fixtures: &FixtureMap,
    tables: &CodeTables,
    options: &AggregateOptions,
) -> AggregationRun {
    let index = GameweekIndex::build(players);

    let results: Vec<Option<AggregatedPlayerRecord>> = players
        .par_iter()
        .map(|player| aggregate_player(player, &index, tables, options))
        .collect();

    let skipped_unnamed = results.iter().filter(|r| r.is_none()).count();
    let mut records: Vec<AggregatedPlayerRecord> = results.into_iter().flatten().collect();
    fixtures::attach(&mut records, fixtures);

    let summary = RunSummary {
        players_in: players.len(),
        emitted: records.len(),
        skipped_unnamed,
        gameweek_columns: index.len(),
        recent_window: options.recent_window,
    };
    info!(
        "aggregated {} of {} players ({} unnamed skipped) over {} gameweek columns",
        summary.emitted, summary.players_in, summary.skipped_unnamed, summary.gameweek_columns
    );

    AggregationRun {
        index,
        records,
        summary,
    }
}
