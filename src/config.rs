//! Application configuration: JSON file, environment and command line.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AiConfig, AiConfigError, BoardSnapshot, HUMAN_SIDE};
use crate::engine::ShakmatyFactory;

/// Environment variable naming the config file when `--config` is absent
pub const CONFIG_ENV: &str = "CHESS_SHELL_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid AI configuration: {0}")]
    Ai(#[from] AiConfigError),

    #[error("invalid start position: {0}")]
    StartPosition(String),
}

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "chess-shell", version, about = "Play chess against an engine")]
pub struct Args {
    /// JSON config file (defaults to $CHESS_SHELL_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// UCI engine binary; overrides the config file
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// AI level 1-5; overrides the config file
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub level: Option<u8>,

    /// Print the JSON schema of the config file and exit
    #[arg(long)]
    pub print_config_schema: bool,
}

/// External engine process
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// UCI engine binary; without one the AI plays random legal moves
    pub path: Option<PathBuf>,
    /// Extra arguments passed to the engine
    pub args: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub engine: EngineConfig,
    /// AI strength used for the first game
    pub ai: AiConfig,
    /// Custom start position as FEN; White must be to move
    pub start_fen: Option<String>,
    /// Default `tracing` filter; RUST_LOG takes precedence
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            ai: AiConfig::default(),
            start_fen: None,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file, then command line overrides
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let path = args
            .config
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_args(args)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_args(&mut self, args: &Args) -> Result<(), ConfigError> {
        if let Some(engine) = &args.engine {
            self.engine.path = Some(engine.clone());
        }
        if let Some(level) = args.level {
            self.ai = AiConfig::level(level)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ai.validate()?;
        self.start_snapshot()?;
        Ok(())
    }

    /// The configured start position, checked for a playable human turn
    pub fn start_snapshot(&self) -> Result<Option<BoardSnapshot>, ConfigError> {
        let Some(fen) = &self.start_fen else {
            return Ok(None);
        };
        let snapshot = ShakmatyFactory::snapshot_from_fen(fen)
            .map_err(|e| ConfigError::StartPosition(e.to_string()))?;
        if snapshot.turn() != HUMAN_SIDE {
            return Err(ConfigError::StartPosition(
                "White must be to move".to_string(),
            ));
        }
        if snapshot.is_terminal() {
            return Err(ConfigError::StartPosition(
                "the game is already over".to_string(),
            ));
        }
        Ok(Some(snapshot))
    }

    /// JSON schema of the config file
    pub fn schema_json() -> String {
        let schema = schemars::schema_for!(AppConfig);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}
