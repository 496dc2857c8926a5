use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ChessResult;
use crate::types::Color;

/// Settings for the computer side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// `false` turns the game into human against human
    pub enabled: bool,
    pub color: Color,
    /// Plies searched per move
    pub depth: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color::Black,
            depth: 2,
        }
    }
}

/// Game settings, usually read from a TOML file.
///
/// ```toml
/// advanced_logging = true
/// log_dir = "logs"
///
/// [ai]
/// color = "White"
/// depth = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// `None` (or `enabled = false`) means two human players
    pub ai: Option<AiConfig>,
    pub advanced_logging: bool,
    pub log_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ai: Some(AiConfig::default()),
            advanced_logging: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl GameConfig {
    /// The computer side, if one is playing
    pub fn opponent(&self) -> Option<AiConfig> {
        self.ai.filter(|ai| ai.enabled)
    }

    pub fn from_toml_str(text: &str) -> ChessResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ChessResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
