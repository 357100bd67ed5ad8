//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Animation time comes in through `Board::tick`, never from a system clock
//! - Seeded RNG only, and only while building the initial layout
//! - Stable iteration order (column-major cells, ball ids)
//! - No rendering or platform dependencies

pub mod ball;
pub mod board;
pub mod grid;
pub mod score;

pub use ball::{Ball, BallEvent, BallState, drop_position, spin_phase, vanish_size};
pub use board::{Board, BoardConfig, Sprite};
pub use grid::{BallId, ClusterId, ColorIndex, Grid};
pub use score::{ScoreRecord, board_size_label, clear_bonus, cluster_points};
