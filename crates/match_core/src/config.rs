//! Match configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [engine]
//! path = "stockfish"
//! standard_skill = 10
//! master_skill = 20
//! move_time_ms = 1000
//! think_delay_ms = 500
//!
//! [fallback]
//! delay_ms = 800
//!
//! [sound]
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::Difficulty;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub engine: EngineConfig,
    pub fallback: FallbackConfig,
    pub sound: SoundConfig,
    pub clock: ClockConfig,
}

impl MatchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// External UCI engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable to launch
    pub path: PathBuf,
    /// Extra command-line arguments
    pub args: Vec<String>,
    /// Skill Level sent for the Standard difficulty
    pub standard_skill: u8,
    /// Skill Level sent for the Master difficulty
    pub master_skill: u8,
    /// Search budget passed as `go movetime`
    pub move_time_ms: u64,
    /// Pause before the search is sent, so the opponent appears to think
    pub think_delay_ms: u64,
}

impl EngineConfig {
    pub fn skill_for(&self, difficulty: Difficulty) -> u8 {
        match difficulty {
            Difficulty::Standard => self.standard_skill,
            Difficulty::Master => self.master_skill,
        }
    }

    pub fn move_time(&self) -> Duration {
        Duration::from_millis(self.move_time_ms)
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            standard_skill: 10,
            master_skill: 20,
            move_time_ms: 1000,
            think_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Pause before a random move is played
    pub delay_ms: u64,
}

impl FallbackConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { delay_ms: 800 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// How often the elapsed time is recomputed
    pub tick_ms: u64,
}

impl ClockConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick_ms: 1000 }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
