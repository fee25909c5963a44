// Run orchestration: fetch, aggregate, write, record.
//
// One run is a straight line through the collaborators:
// 1. Load players from the configured source (fatal on failure)
// 2. Load upcoming fixtures (non-fatal; the run continues without them)
// 3. Aggregate on the blocking pool
// 4. Write the JSON document and optional CSV export
// 5. Record the document in the history store when enabled (non-fatal)

use anyhow::Context;
use tracing::{info, warn};

use aerial_core::{aggregate_population, FixtureMap, RunSummary};

use crate::config::Config;
use crate::history::{HistoryStore, RunEntry};
use crate::output;
use crate::source::Source;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub fixture_clubs: usize,
    pub history: Option<RunEntry>,
}

pub async fn run(config: &Config) -> anyhow::Result<RunReport> {
    let source = Source::from_config(&config.source).context("failed to set up data source")?;
    info!("reading from {}", source.describe());

    let players = source
        .load_players()
        .await
        .context("failed to load player data")?;

    let fixtures = match source.load_fixtures().await {
        Ok(fixtures) => fixtures,
        Err(e) => {
            warn!("continuing without upcoming fixtures: {e}");
            FixtureMap::new()
        }
    };
    let fixture_clubs = fixtures.len();

    let tables = config.code_tables();
    let options = config.aggregate_options();
    let run = tokio::task::spawn_blocking(move || {
        aggregate_population(&players, &fixtures, &tables, &options)
    })
    .await
    .context("aggregation task failed")?;

    output::write_json(&config.output.json_path, &run.records)
        .context("failed to write JSON output")?;
    if let Some(csv_path) = &config.output.csv_path {
        output::write_csv(csv_path, &run).context("failed to write CSV output")?;
    }

    let history = if config.history.enabled {
        match record_history(config, &run) {
            Ok(entry) => {
                info!(
                    "recorded run for {} in {}",
                    entry.run_date, config.history.db_path
                );
                Some(entry)
            }
            Err(e) => {
                warn!("run history not updated: {e:#}");
                None
            }
        }
    } else {
        None
    };

    Ok(RunReport {
        summary: run.summary,
        fixture_clubs,
        history,
    })
}

fn record_history(config: &Config, run: &aerial_core::AggregationRun) -> anyhow::Result<RunEntry> {
    let document = output::to_json(&run.records)?;
    let store = HistoryStore::open(&config.history.db_path)?;
    store.record_run(run.records.len(), run.index.len(), &document)
}
