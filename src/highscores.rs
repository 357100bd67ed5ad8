//! High score leaderboard system
//!
//! Tracks the top 10 scores, persisted as a small comma-separated text
//! table with a header row.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::ScoreRecord;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Header row of the text table
pub const HEADER: &str = "version,points,cleared_board,board_size,num_colors,timestamp";

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    /// Best first
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a record qualifies for the leaderboard
    pub fn qualifies(&self, record: &ScoreRecord) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if record beats the lowest entry
        self.entries.last().map(|e| record.beats(e)).unwrap_or(true)
    }

    /// Get the rank a record would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, record: &ScoreRecord) -> Option<usize> {
        if !self.qualifies(record) {
            return None;
        }
        let rank = self.entries.iter().position(|e| record.beats(e));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a record to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add(&mut self, record: ScoreRecord) -> Option<usize> {
        let rank = self.potential_rank(&record)?;
        self.entries.insert(rank - 1, record);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top record (if any)
    pub fn top(&self) -> Option<&ScoreRecord> {
        self.entries.first()
    }

    /// Encode as header row plus one row per record
    pub fn to_text(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        for e in &self.entries {
            out.push_str(&format!(
                "{},{},{},{},{},{}\n",
                e.version, e.points, e.cleared_board, e.board_size, e.num_colors, e.timestamp
            ));
        }
        out
    }

    /// Decode a table written by `to_text`; rows are re-ranked and capped
    pub fn from_text(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
        match lines.next() {
            Some((_, header)) if header.trim() == HEADER => {}
            Some((i, _)) => {
                return Err(Error::ScoreTable {
                    line: i + 1,
                    reason: "unexpected header".into(),
                });
            }
            None => return Ok(Self::new()),
        }

        let mut records = lines
            .map(|(i, line)| parse_row(line).map_err(|reason| Error::ScoreTable { line: i + 1, reason }))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by(|a, b| a.rank_cmp(b));
        records.truncate(MAX_HIGH_SCORES);
        Ok(Self { entries: records })
    }

    /// Load from `path`; a missing file is an empty table
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => {
                let scores = Self::from_text(&text)?;
                log::info!("Loaded {} high scores", scores.entries.len());
                Ok(scores)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from `path`, falling back to an empty table on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path.as_ref()).unwrap_or_else(|e| {
            log::warn!("Ignoring high scores in {}: {e}", path.as_ref().display());
            Self::new()
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_text())?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

fn parse_row(line: &str) -> std::result::Result<ScoreRecord, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [version, points, cleared, board_size, num_colors, timestamp] = fields.as_slice() else {
        return Err(format!("expected 6 fields, found {}", fields.len()));
    };
    Ok(ScoreRecord {
        version: version.parse().map_err(|_| format!("bad version {version:?}"))?,
        points: points.parse().map_err(|_| format!("bad points {points:?}"))?,
        cleared_board: cleared.parse().map_err(|_| format!("bad cleared_board {cleared:?}"))?,
        board_size: board_size.to_string(),
        num_colors: num_colors.parse().map_err(|_| format!("bad num_colors {num_colors:?}"))?,
        timestamp: timestamp.parse().map_err(|_| format!("bad timestamp {timestamp:?}"))?,
    })
}
