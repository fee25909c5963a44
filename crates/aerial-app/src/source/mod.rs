// Player and fixture data sources: the GraphQL API or a scraped JSON file.

pub mod api;
pub mod file;

use std::path::PathBuf;

use aerial_core::{FixtureMap, PlayerRecord};
use thiserror::Error;
use tracing::info;

use crate::config::{SourceConfig, SourceMode};

pub use api::GraphQlClient;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("GraphQL endpoint reported an error: {message}")]
    GraphQl { message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A configured data source.
#[derive(Debug, Clone)]
pub enum Source {
    Api(GraphQlClient),
    File {
        input_path: PathBuf,
        fixtures_path: Option<PathBuf>,
    },
}

impl Source {
    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        match config.mode {
            SourceMode::Api => Ok(Source::Api(GraphQlClient::new(
                &config.api_url,
                config.timeout,
            )?)),
            SourceMode::File => Ok(Source::File {
                // Validation guarantees a path in file mode.
                input_path: config.input_path.clone().unwrap_or_default(),
                fixtures_path: config.fixtures_path.clone(),
            }),
        }
    }

    /// Human-readable origin, for log lines.
    pub fn describe(&self) -> String {
        match self {
            Source::Api(client) => format!("GraphQL API at {}", client.url()),
            Source::File { input_path, .. } => format!("file {}", input_path.display()),
        }
    }

    pub async fn load_players(&self) -> Result<Vec<PlayerRecord>, SourceError> {
        let players = match self {
            Source::Api(client) => client.fetch_players().await?,
            Source::File { input_path, .. } => file::load_players(input_path).await?,
        };
        info!("loaded {} player records from {}", players.len(), self.describe());
        Ok(players)
    }

    /// Upcoming fixtures per club. A file source without a fixtures file has
    /// none.
    pub async fn load_fixtures(&self) -> Result<FixtureMap, SourceError> {
        let fixtures = match self {
            Source::Api(client) => client.fetch_fixtures().await?,
            Source::File {
                fixtures_path: Some(path),
                ..
            } => file::load_fixtures(path).await?,
            Source::File {
                fixtures_path: None,
                ..
            } => FixtureMap::new(),
        };
        let count: usize = fixtures.values().map(Vec::len).sum();
        info!("loaded {count} upcoming fixtures for {} clubs", fixtures.len());
        Ok(fixtures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn source_config(mode: SourceMode) -> SourceConfig {
        SourceConfig {
            mode,
            api_url: "http://127.0.0.1:1/graphql".into(),
            timeout: Duration::from_secs(5),
            input_path: Some(PathBuf::from("data/data.json")),
            fixtures_path: None,
        }
    }

    #[test]
    fn builds_api_source() {
        let source = Source::from_config(&source_config(SourceMode::Api)).unwrap();
        assert!(matches!(source, Source::Api(_)));
        assert_eq!(source.describe(), "GraphQL API at http://127.0.0.1:1/graphql");
    }

    #[test]
    fn builds_file_source() {
        let source = Source::from_config(&source_config(SourceMode::File)).unwrap();
        match &source {
            Source::File {
                input_path,
                fixtures_path,
            } => {
                assert_eq!(input_path, &PathBuf::from("data/data.json"));
                assert!(fixtures_path.is_none());
            }
            other => panic!("expected file source, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn file_source_without_fixtures_has_none() {
        let source = Source::from_config(&source_config(SourceMode::File)).unwrap();
        assert!(source.load_fixtures().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_input_file_is_io_error() {
        let mut config = source_config(SourceMode::File);
        config.input_path = Some(std::env::temp_dir().join("aerial_source_missing/data.json"));
        let source = Source::from_config(&config).unwrap();
        match source.load_players().await {
            Err(SourceError::Io { path, .. }) => assert!(path.ends_with("data.json")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
