// Output writers: the JSON document consumed by the table UI and an optional
// flat CSV export.

use std::io::Write;
use std::path::{Path, PathBuf};

use aerial_core::{AggregatedPlayerRecord, AggregationRun, ContributionKind, GameweekCell};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Serialize the records as a pretty-printed JSON array.
pub fn to_json(records: &[AggregatedPlayerRecord]) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write the records to `path`. The file is replaced in one step so readers
/// never see a partial document.
pub fn write_json(path: &Path, records: &[AggregatedPlayerRecord]) -> Result<(), OutputError> {
    let json = to_json(records)?;
    write_replacing(path, json.as_bytes())?;
    info!("wrote {} player records to {}", records.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write one row per player: the scalar columns, then points per gameweek
/// with DNP columns shown as the placeholder.
pub fn write_csv_to<W: Write>(writer: W, run: &AggregationRun) -> Result<(), OutputError> {
    let n = run.summary.recent_window;
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = [
        "Name",
        "Club",
        "Position",
        "Nationality",
        "Value",
        "Selected Percentage",
        "Total Points",
        "Total Games Played",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.push(format!("Total Over {n} Gameweeks"));
    header.push(format!("Games Played Over {n} Gameweeks"));
    header.push("Points Per Game".into());
    header.push(format!("Points Per Game Over {n} Gameweeks"));
    header.push("Points Per Million".into());
    header.push(format!("Points Per Million Over {n} Gameweeks"));
    header.extend(ContributionKind::ALL.iter().map(|k| k.total_column().to_string()));
    header.extend(run.index.columns().map(|gw| gw.to_string()));
    wtr.write_record(&header)?;

    for r in &run.records {
        let mut row = vec![
            r.name.clone(),
            r.club.clone(),
            r.position.clone(),
            r.nationality.clone(),
            r.value.to_string(),
            r.selected_percentage.to_string(),
            r.total_points.to_string(),
            r.games_played.to_string(),
            r.recent_points.to_string(),
            r.recent_games_played.to_string(),
            r.points_per_game.to_string(),
            r.recent_points_per_game.to_string(),
            r.points_per_million.to_string(),
            r.recent_points_per_million.to_string(),
        ];
        row.extend(
            ContributionKind::ALL
                .iter()
                .map(|k| r.contribution_total(*k).column_value(*k).to_string()),
        );
        row.extend(r.gameweeks.iter().map(|(_, cell)| match cell {
            GameweekCell::NotPlayed => aerial_core::DNP_PLACEHOLDER.to_string(),
            GameweekCell::Played(m) => m.points.to_string(),
        }));
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_csv(path: &Path, run: &AggregationRun) -> Result<(), OutputError> {
    let mut buf = Vec::new();
    write_csv_to(&mut buf, run)?;
    write_replacing(path, &buf)?;
    info!("wrote CSV export to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
