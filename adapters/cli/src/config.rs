//! Game configuration loaded from TOML and overridden from the command line.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use grid_snake_core::{EdgePolicy, GridSize};
use grid_snake_system_milestone::MilestoneThreshold;
use grid_snake_system_scoreboard::ScoreStyle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating the game configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// I/O error reading the configuration file.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// How the milestone score is chosen for each session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub(crate) enum MilestoneSetting {
    /// Same score every session.
    Fixed {
        /// Score that opens the interstitial.
        fixed: u32,
    },
    /// Score drawn from an inclusive range every session.
    Random {
        /// Lowest score that may be drawn.
        min: u32,
        /// Highest score that may be drawn.
        max: u32,
    },
}

impl Default for MilestoneSetting {
    fn default() -> Self {
        Self::from(MilestoneThreshold::DEFAULT)
    }
}

impl From<MilestoneThreshold> for MilestoneSetting {
    fn from(threshold: MilestoneThreshold) -> Self {
        match threshold {
            MilestoneThreshold::Fixed(fixed) => Self::Fixed { fixed },
            MilestoneThreshold::Random { min, max } => Self::Random { min, max },
        }
    }
}

impl From<MilestoneSetting> for MilestoneThreshold {
    fn from(setting: MilestoneSetting) -> Self {
        match setting {
            MilestoneSetting::Fixed { fixed } => Self::Fixed(fixed),
            MilestoneSetting::Random { min, max } => Self::Random { min, max },
        }
    }
}

/// Value shown on the HUD in place of the score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ScoreDisplay {
    /// Shows the score unchanged.
    Literal,
    /// Shows joke values.
    #[default]
    Chaotic,
}

impl From<ScoreDisplay> for ScoreStyle {
    fn from(display: ScoreDisplay) -> Self {
        match display {
            ScoreDisplay::Literal => Self::Literal,
            ScoreDisplay::Chaotic => Self::Chaotic,
        }
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    /// Number of cells along each side of the grid.
    pub(crate) grid_size: u32,
    /// Behaviour at the grid boundary.
    pub(crate) edge_policy: EdgePolicy,
    /// Milliseconds between simulation steps.
    pub(crate) tick_interval_ms: u64,
    /// Seed for every random draw; drawn from entropy when absent.
    pub(crate) seed: Option<u64>,
    /// Milestone threshold.
    pub(crate) milestone: MilestoneSetting,
    /// HUD score style.
    pub(crate) score_display: ScoreDisplay,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: grid_snake_core::DEFAULT_GRID_SIZE.get(),
            edge_policy: EdgePolicy::default(),
            tick_interval_ms: 150,
            seed: None,
            milestone: MilestoneSetting::default(),
            score_display: ScoreDisplay::default(),
        }
    }
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) grid_size: Option<u32>,
    pub(crate) edge_policy: Option<EdgePolicy>,
    pub(crate) tick_interval_ms: Option<u64>,
    pub(crate) seed: Option<u64>,
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub(crate) fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the configuration from an optional file and command-line overrides.
    pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Replaces fields with any values present in `overrides`.
    #[must_use]
    pub(crate) fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(grid_size) = overrides.grid_size {
            self.grid_size = grid_size;
        }
        if let Some(edge_policy) = overrides.edge_policy {
            self.edge_policy = edge_policy;
        }
        if let Some(tick_interval_ms) = overrides.tick_interval_ms {
            self.tick_interval_ms = tick_interval_ms;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        self
    }

    /// Checks that every value can drive a session.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size().validate().is_err() {
            return Err(ConfigError::Validation(format!(
                "grid_size must be between {} and {} (received {})",
                GridSize::MIN.get(),
                GridSize::MAX.get(),
                self.grid_size
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "tick_interval_ms must be positive".to_owned(),
            ));
        }
        match self.milestone {
            MilestoneSetting::Fixed { fixed: 0 } => Err(ConfigError::Validation(
                "milestone.fixed must be at least 1".to_owned(),
            )),
            MilestoneSetting::Random { min, max } if min == 0 || max == 0 => {
                Err(ConfigError::Validation(
                    "milestone.min and milestone.max must be at least 1".to_owned(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Grid dimensions.
    pub(crate) fn grid_size(&self) -> GridSize {
        GridSize::new(self.grid_size)
    }

    /// Interval between simulation steps.
    pub(crate) fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Seed in effect, drawing one from entropy when none was configured.
    pub(crate) fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
