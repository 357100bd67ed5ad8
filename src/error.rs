//! Error type shared by the simulation and persistence layers

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Seed text is not an 8-character base32 token
    #[error("invalid game seed {0:?}")]
    InvalidSeed(String),

    /// A board operation was called out of sequence (caller bug)
    #[error("invalid board state: {0}")]
    InvalidState(&'static str),

    /// Sprite sheet cannot be split into frames
    #[error("malformed sprite sheet: {0}")]
    ImageAsset(String),

    /// Board dimensions or colour count are unusable
    #[error("invalid board configuration: {0}")]
    InvalidConfig(String),

    /// High-score table row could not be parsed
    #[error("score table line {line}: {reason}")]
    ScoreTable { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
