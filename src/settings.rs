//! Game settings and preferences
//!
//! Persisted as JSON next to the high-score table.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{MAX_COLORS, MAX_CPU_LOAD, MAX_FPS, MIN_COLORS};
use crate::error::Result;
use crate::seed::GameSeed;
use crate::sim::BoardConfig;

/// Board size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoardSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BoardSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardSize::Small => "Small",
            BoardSize::Medium => "Medium",
            BoardSize::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Some(BoardSize::Small),
            "medium" | "med" | "m" => Some(BoardSize::Medium),
            "large" | "l" => Some(BoardSize::Large),
            _ => None,
        }
    }

    /// (columns, rows)
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            BoardSize::Small => (6, 5),
            BoardSize::Medium => (10, 7),
            BoardSize::Large => (15, 10),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board_size: BoardSize,
    /// Number of ball colours (difficulty)
    pub num_colors: usize,
    /// Seed of the last game started, to offer a replay
    #[serde(deserialize_with = "lenient_seed")]
    pub last_seed: Option<GameSeed>,

    // === Frame pacing ===
    pub max_fps: f64,
    /// Fraction of wall time the simulation may use
    pub max_cpu_load: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_size: BoardSize::Medium,
            num_colors: 4,
            last_seed: None,
            max_fps: MAX_FPS,
            max_cpu_load: MAX_CPU_LOAD,
        }
    }
}

/// A saved seed that no longer parses is dropped on its own, keeping the
/// rest of the file
fn lenient_seed<'de, D>(deserializer: D) -> std::result::Result<Option<GameSeed>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.as_str().map(GameSeed::parse) {
        Some(Ok(seed)) => Some(seed),
        Some(Err(e)) => {
            log::warn!("Ignoring saved seed: {e}");
            None
        }
        None => {
            log::warn!("Ignoring saved seed: not a string ({value})");
            None
        }
    }))
}

impl Settings {
    /// Clamp values a hand-edited file may have pushed out of range
    pub fn validated(mut self) -> Self {
        self.num_colors = self.num_colors.clamp(MIN_COLORS, MAX_COLORS);
        if !(self.max_fps > 0.0) {
            self.max_fps = MAX_FPS;
        }
        if !(self.max_cpu_load > 0.0 && self.max_cpu_load <= 1.0) {
            self.max_cpu_load = MAX_CPU_LOAD;
        }
        self
    }

    /// Board configuration for a surface of the given size
    pub fn board_config(&self, width_px: u32, height_px: u32) -> BoardConfig {
        let (columns, rows) = self.board_size.dimensions();
        BoardConfig::new(width_px, height_px, self.num_colors, columns, rows)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let parsed = fs::read_to_string(path)
            .map_err(crate::Error::from)
            .and_then(|json| serde_json::from_str::<Settings>(&json).map_err(Into::into));
        match parsed {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.validated()
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {e})", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
