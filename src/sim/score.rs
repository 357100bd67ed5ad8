//! Scoring formula and the record kept in the high-score table

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::consts::SCORE_VERSION;

/// Points for removing a cluster of `n` balls: `n (n - 1)`
#[inline]
pub fn cluster_points(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1)
}

/// Bonus for clearing the whole board
#[inline]
pub fn clear_bonus(columns: usize, rows: usize, num_colors: usize) -> u64 {
    (columns * rows * num_colors) as u64
}

/// "WxH" label used to group scores by board size
pub fn board_size_label(columns: usize, rows: usize) -> String {
    format!("{columns}x{rows}")
}

/// Seconds since the Unix epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// A finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub version: u32,
    pub points: u64,
    pub cleared_board: bool,
    pub board_size: String,
    pub num_colors: usize,
    /// Unix timestamp (seconds) when the game ended
    pub timestamp: u64,
}

impl ScoreRecord {
    pub fn new(
        points: u64,
        cleared_board: bool,
        columns: usize,
        rows: usize,
        num_colors: usize,
        timestamp: u64,
    ) -> Self {
        Self {
            version: SCORE_VERSION,
            points,
            cleared_board,
            board_size: board_size_label(columns, rows),
            num_colors,
            timestamp,
        }
    }

    /// Leaderboard order: `Less` means `self` ranks above `other`.
    /// Newer record versions first, then more points, then cleared boards.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .version
            .cmp(&self.version)
            .then(other.points.cmp(&self.points))
            .then(other.cleared_board.cmp(&self.cleared_board))
    }

    /// Strictly better than `other` on the leaderboard
    pub fn beats(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Less
    }
}
