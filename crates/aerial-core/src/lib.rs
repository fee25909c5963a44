// Aggregation core: raw per-match fantasy records in, flattened per-player
// rows with gameweek columns and tooltips out. No I/O happens here.

pub mod aggregate;
pub mod classify;
pub mod coerce;
pub mod fixtures;
pub mod gameweek;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod tooltip;

pub use aggregate::{
    aggregate_player, AggregateOptions, AggregatedPlayerRecord, GameweekCell, MatchCell,
    DEFAULT_RECENT_WINDOW, DNP_PLACEHOLDER,
};
pub use fixtures::{FixtureMap, UpcomingFixture};
pub use gameweek::GameweekIndex;
pub use lookup::CodeTables;
pub use model::{
    Contribution, ContributionKind, PlayerRecord, RawGameweek, RawMatchRecord, RawNumber, Score,
};
pub use pipeline::{aggregate_population, AggregationRun, RunSummary};
