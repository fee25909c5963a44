// Configuration loading and parsing (league.toml, pipeline.toml).

use aerial_core::{AggregateOptions, CodeTables, ContributionKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub tables: TableOverrides,
    pub source: SourceConfig,
    pub aggregation: AggregationConfig,
    pub output: OutputConfig,
    pub history: HistoryConfig,
}

impl Config {
    /// Built-in code tables with this config's overrides applied.
    pub fn code_tables(&self) -> CodeTables {
        let mut tables = CodeTables::default();
        for (name, code) in &self.tables.teams {
            tables = tables.with_team(name, code);
        }
        for (name, code) in &self.tables.positions {
            tables = tables.with_position(name, code);
        }
        for (kind, label) in &self.tables.labels {
            // Unknown kinds are rejected by validation.
            if let Some(kind) = ContributionKind::from_name(kind) {
                tables = tables.with_label(kind, label);
            }
        }
        tables
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            recent_window: self.aggregation.recent_window,
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    teams: BTreeMap<String, String>,
    #[serde(default)]
    positions: BTreeMap<String, String>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    #[serde(default)]
    pub season: String,
}

/// Name → code and kind → label entries layered over the built-in tables.
#[derive(Debug, Clone, Default)]
pub struct TableOverrides {
    pub teams: BTreeMap<String, String>,
    pub positions: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// pipeline.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire pipeline.toml file.
#[derive(Debug, Clone, Deserialize)]
struct PipelineFile {
    source: SourceSection,
    #[serde(default)]
    aggregation: AggregationConfig,
    output: OutputConfig,
    #[serde(default)]
    history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct SourceSection {
    mode: String,
    #[serde(default = "default_api_url")]
    api_url: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    input_path: Option<String>,
    #[serde(default)]
    fixtures_path: Option<String>,
}

fn default_api_url() -> String {
    crate::source::api::DEFAULT_API_URL.into()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Where player and fixture data is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    /// Query the GraphQL endpoint.
    Api,
    /// Read a scraped `data.json` (and optionally a fixtures file).
    File,
}

impl SourceMode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Some(SourceMode::Api),
            "file" => Some(SourceMode::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub mode: SourceMode,
    pub api_url: String,
    pub timeout: Duration,
    pub input_path: Option<PathBuf>,
    pub fixtures_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    pub recent_window: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            recent_window: aerial_core::DEFAULT_RECENT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub json_path: PathBuf,
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "aerial-history.db".into()
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/pipeline.toml`, relative to the given `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- pipeline.toml (required) ---
    let pipeline_path = config_dir.join("pipeline.toml");
    let pipeline_text = read_file(&pipeline_path)?;
    let pipeline_file: PipelineFile =
        toml::from_str(&pipeline_text).map_err(|e| ConfigError::ParseError {
            path: pipeline_path.clone(),
            source: e,
        })?;

    let source = build_source(pipeline_file.source)?;

    let config = Config {
        league: league_file.league,
        tables: TableOverrides {
            teams: league_file.teams,
            positions: league_file.positions,
            labels: league_file.labels,
        },
        source,
        aggregation: pipeline_file.aggregation,
        output: pipeline_file.output,
        history: pipeline_file.history,
    };

    validate(&config)?;

    Ok(config)
}

fn build_source(section: SourceSection) -> Result<SourceConfig, ConfigError> {
    let mode = SourceMode::parse(&section.mode).ok_or_else(|| ConfigError::ValidationError {
        field: "source.mode".into(),
        message: format!("must be \"api\" or \"file\", got \"{}\"", section.mode),
    })?;
    let non_blank = |p: Option<String>| p.filter(|s| !s.trim().is_empty()).map(PathBuf::from);
    Ok(SourceConfig {
        mode,
        api_url: section.api_url.trim().to_string(),
        timeout: Duration::from_secs(section.timeout_secs),
        input_path: non_blank(section.input_path),
        fixtures_path: non_blank(section.fixtures_path),
    })
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(invalid("league.name", "must not be empty"));
    }

    if config.aggregation.recent_window == 0 {
        return Err(invalid("aggregation.recent_window", "must be greater than 0"));
    }

    let source = &config.source;
    if source.timeout.is_zero() {
        return Err(invalid("source.timeout_secs", "must be greater than 0"));
    }
    match source.mode {
        SourceMode::Api if source.api_url.is_empty() => {
            return Err(invalid("source.api_url", "required when mode = \"api\""));
        }
        SourceMode::File if source.input_path.is_none() => {
            return Err(invalid("source.input_path", "required when mode = \"file\""));
        }
        _ => {}
    }

    if config.output.json_path.as_os_str().is_empty() {
        return Err(invalid("output.json_path", "must not be empty"));
    }

    if config.history.enabled && config.history.db_path.trim().is_empty() {
        return Err(invalid("history.db_path", "required when history is enabled"));
    }

    for (kind, label) in &config.tables.labels {
        if ContributionKind::from_name(kind).is_none() {
            return Err(invalid(
                &format!("labels.{kind}"),
                "not a known contribution kind",
            ));
        }
        if label.trim().is_empty() {
            return Err(invalid(&format!("labels.{kind}"), "label must not be empty"));
        }
    }

    for (table, entries) in [
        ("teams", &config.tables.teams),
        ("positions", &config.tables.positions),
    ] {
        if let Some((name, _)) = entries.iter().find(|(_, code)| code.trim().is_empty()) {
            return Err(invalid(&format!("{table}.{name}"), "code must not be empty"));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
