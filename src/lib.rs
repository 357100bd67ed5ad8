//! Same Ball - a "same game" style puzzle of coloured balls
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clusters, ball animation, board controller, scoring)
//! - `seed`: Shareable game seeds and the seeded RNG stream
//! - `assets`: Sprite-sheet metadata injected into the board
//! - `layout`: Pixel geometry (cell size, padding, hit-testing)
//! - `highscores`: Persisted top-10 score table
//! - `settings`: Player preferences
//! - `pacing`: Tick scheduling helper for the hosting event loop

pub mod assets;
pub mod error;
pub mod highscores;
pub mod layout;
pub mod pacing;
pub mod seed;
pub mod settings;
pub mod sim;

pub use assets::{AssetTable, SpriteSheet};
pub use error::{Error, Result};
pub use highscores::HighScores;
pub use layout::{Cell, Layout, Rect};
pub use pacing::TickPacer;
pub use seed::GameSeed;
pub use settings::{BoardSize, Settings};
pub use sim::{Ball, BallState, Board, BoardConfig, Grid, ScoreRecord};

/// Game configuration constants
pub mod consts {
    /// One full spin of a highlighted ball (seconds)
    pub const SPIN_DURATION_S: f64 = 2.0;

    /// How long a committed ball takes to vanish (seconds)
    pub const VANISH_DURATION_S: f64 = 0.250;
    /// Vanish acceleration away from the viewer (cells/s²)
    pub const VANISH_ACCEL: f64 = 500.0;
    /// Distance from the viewer to the board (cells)
    pub const Z_VIEWER: f64 = 5.0;

    /// Horizontal drop acceleration (cells/s²)
    pub const DROP_ACCEL_COL: f64 = 10.0;
    /// Vertical drop acceleration (cells/s²)
    pub const DROP_ACCEL_ROW: f64 = 10.0;

    /// Supported colour counts
    pub const MIN_COLORS: usize = 3;
    pub const MAX_COLORS: usize = 6;

    /// Score record layout version; newer versions rank first
    pub const SCORE_VERSION: u32 = 1;

    /// Frame pacing defaults
    pub const MAX_FPS: f64 = 60.0;
    pub const MAX_CPU_LOAD: f64 = 0.5;
}
