//! AI configuration: a predefined level or a custom parameter bundle.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;
pub const DEFAULT_LEVEL: u8 = 3;

const MAX_DEPTH: u32 = 30;
const MAX_EXTENDED_DEPTH: u32 = 10;
const MAX_QUIESCENCE_DEPTH: u32 = 20;
const MAX_MEMORY_MB: u32 = 4096;
const MAX_RANDOMNESS: u32 = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiConfigError {
    #[error("AI level {0} is out of range (1-5)")]
    LevelOutOfRange(u8),

    #[error("{field} = {value} is out of range ({min}-{max})")]
    ParamOutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// A predefined strength level
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "u8", into = "u8")]
pub struct AiLevel(u8);

impl AiLevel {
    pub fn new(level: u8) -> Result<Self, AiConfigError> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(AiConfigError::LevelOutOfRange(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = AiLevel> {
        (MIN_LEVEL..=MAX_LEVEL).map(AiLevel)
    }

    /// The parameter bundle this level stands for
    pub fn params(self) -> SearchParams {
        let (depth, extended_depth, quiescence_depth, check_extension, memory_mb, randomness) =
            match self.0 {
                1 => (1, 0, 1, false, 8, 120),
                2 => (2, 1, 2, false, 16, 60),
                3 => (3, 2, 4, true, 32, 20),
                4 => (4, 3, 6, true, 64, 0),
                _ => (5, 4, 8, true, 128, 0),
            };
        SearchParams {
            depth,
            extended_depth,
            quiescence_depth,
            check_extension,
            memory_mb,
            randomness,
        }
    }
}

impl Default for AiLevel {
    fn default() -> Self {
        Self(DEFAULT_LEVEL)
    }
}

impl TryFrom<u8> for AiLevel {
    type Error = AiConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<AiLevel> for u8 {
    fn from(level: AiLevel) -> u8 {
        level.0
    }
}

/// Custom search parameters
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Base search depth in plies
    pub depth: u32,
    /// Additional plies searched on top of the base depth
    pub extended_depth: u32,
    /// Maximum capture-sequence depth beyond the horizon
    pub quiescence_depth: u32,
    /// Extend the search when the side to move is in check
    pub check_extension: bool,
    /// Transposition table budget in MiB
    pub memory_mb: u32,
    /// Centipawn window for picking a move other than the best one
    pub randomness: u32,
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), AiConfigError> {
        check_range("depth", self.depth, 1, MAX_DEPTH)?;
        check_range("extended_depth", self.extended_depth, 0, MAX_EXTENDED_DEPTH)?;
        check_range(
            "quiescence_depth",
            self.quiescence_depth,
            0,
            MAX_QUIESCENCE_DEPTH,
        )?;
        check_range("memory_mb", self.memory_mb, 1, MAX_MEMORY_MB)?;
        check_range("randomness", self.randomness, 0, MAX_RANDOMNESS)?;
        Ok(())
    }

    /// Depth passed to the engine
    pub fn total_depth(&self) -> u32 {
        self.depth + self.extended_depth
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        AiLevel::default().params()
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), AiConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(AiConfigError::ParamOutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Exactly one mode is active at a time
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AiConfig {
    Level { level: AiLevel },
    Custom(SearchParams),
}

impl AiConfig {
    pub fn level(level: u8) -> Result<Self, AiConfigError> {
        Ok(AiConfig::Level {
            level: AiLevel::new(level)?,
        })
    }

    pub fn custom(params: SearchParams) -> Result<Self, AiConfigError> {
        params.validate()?;
        Ok(AiConfig::Custom(params))
    }

    /// Resolved parameters, whichever mode is active
    pub fn params(&self) -> SearchParams {
        match self {
            AiConfig::Level { level } => level.params(),
            AiConfig::Custom(params) => *params,
        }
    }

    pub fn validate(&self) -> Result<(), AiConfigError> {
        match self {
            AiConfig::Level { .. } => Ok(()),
            AiConfig::Custom(params) => params.validate(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, AiConfig::Custom(_))
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::Level {
            level: AiLevel::default(),
        }
    }
}

impl fmt::Display for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiConfig::Level { level } => write!(f, "Level {}", level.get()),
            AiConfig::Custom(p) => write!(
                f,
                "Custom (depth {}+{}, q{}, {} MiB)",
                p.depth, p.extended_depth, p.quiescence_depth, p.memory_mb
            ),
        }
    }
}
