//! Game Configuration
//!
//! Grid shape, seed, difficulty presets and animation timing.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::layout::{LayoutOptions, Viewport};

/// Configuration errors. Raised before any board is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A grid dimension is zero.
    #[error("Grid dimensions must be positive (got {cols}x{rows})")]
    EmptyGrid {
        /// Requested columns
        cols: u32,
        /// Requested rows
        rows: u32,
    },

    /// Odd number of cells, so cards cannot all be paired.
    #[error("Grid {cols}x{rows} has an odd number of cells")]
    OddCellCount {
        /// Requested columns
        cols: u32,
        /// Requested rows
        rows: u32,
    },

    /// No weapons to build pairs from.
    #[error("Weapon catalog is empty")]
    EmptyCatalog,
}

/// Board configuration. This is also the persisted `config` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid columns
    pub cols: u32,
    /// Grid rows
    pub rows: u32,
    /// Seed for board generation
    pub seed: String,
}

impl GameConfig {
    /// Create a configuration.
    pub fn new(cols: u32, rows: u32, seed: impl Into<String>) -> Self {
        Self {
            cols,
            rows,
            seed: seed.into(),
        }
    }

    /// Create a configuration from a difficulty preset.
    pub fn from_difficulty(difficulty: Difficulty, seed: impl Into<String>) -> Self {
        let (cols, rows) = difficulty.grid();
        Self::new(cols, rows, seed)
    }

    /// Create a configuration with a fresh random seed.
    pub fn with_random_seed(cols: u32, rows: u32) -> Self {
        Self::new(cols, rows, uuid::Uuid::new_v4().to_string())
    }

    /// Total number of card slots.
    pub fn total_cards(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Number of pairs on the board.
    pub fn pairs(&self) -> usize {
        self.total_cards() / 2
    }

    /// Check the grid can be fully paired.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if self.total_cards() % 2 != 0 {
            return Err(ConfigError::OddCellCount {
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::default(), "memory")
    }
}

/// Difficulty presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 4x3, 6 pairs
    Easy,
    /// 4x4, 8 pairs
    #[default]
    Medium,
    /// 6x6, 18 pairs
    Hard,
}

impl Difficulty {
    /// Grid shape `(cols, rows)` for this preset.
    pub fn grid(self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (4, 3),
            Difficulty::Medium => (4, 4),
            Difficulty::Hard => (6, 6),
        }
    }

    /// Parse a preset name (`easy`, `medium`, `hard`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Animation and pause timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Length of one flip transition.
    pub flip_duration: Duration,
    /// Pause before a mismatched pair flips back.
    pub mismatch_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            flip_duration: Duration::from_millis(150),
            mismatch_delay: Duration::from_millis(500),
        }
    }
}

impl TimingConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// Reads `MEMORY_FLIP_MS` and `MEMORY_MISMATCH_MS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            flip_duration: env_millis("MEMORY_FLIP_MS").unwrap_or(defaults.flip_duration),
            mismatch_delay: env_millis("MEMORY_MISMATCH_MS").unwrap_or(defaults.mismatch_delay),
        }
    }

    /// Flip duration in whole milliseconds.
    pub fn flip_ms(&self) -> u64 {
        self.flip_duration.as_millis() as u64
    }

    /// Mismatch delay in whole milliseconds.
    pub fn mismatch_ms(&self) -> u64 {
        self.mismatch_delay.as_millis() as u64
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Everything about a board that is not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManagerSettings {
    /// Spacing used by the layout
    pub layout: LayoutOptions,
    /// Animation timing
    pub timing: TimingConfig,
    /// Initial viewport
    pub viewport: Viewport,
}
