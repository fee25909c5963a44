// Gameweek aggregation entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config (copying defaults on first run)
// 3. Run the pipeline once and report

use aerial_app::app;
use aerial_app::config;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("aerial starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={} {}, source={:?}, recent window={}",
        config.league.name,
        config.league.season,
        config.source.mode,
        config.aggregation.recent_window
    );

    let report = app::run(&config).await?;
    info!(
        "Run complete: {} players written ({} unnamed skipped), {} gameweek columns, fixtures for {} clubs",
        report.summary.emitted,
        report.summary.skipped_unnamed,
        report.summary.gameweek_columns,
        report.fixture_clubs
    );

    Ok(())
}

/// Initialize tracing on stderr; stdout stays free for piping.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aerial=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
