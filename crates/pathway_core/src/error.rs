//! Error types for Pathway.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PathwayError>;

#[derive(Error, Debug)]
pub enum PathwayError {
    #[error("rank {0} is out of range (expected 1..=2800)")]
    RankOutOfRange(u32),

    #[error("invalid bucket: step {step}, level {level} (expected step 1..=28, level 1..=5)")]
    InvalidBucket { step: u32, level: u32 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("\"{word}\" already exists in the 2800-word list at step {step}, level {level}")]
    CatalogCollision { word: String, step: u32, level: u32 },

    #[error("rank {rank} is already assigned to \"{existing}\"")]
    DuplicateRank { rank: u32, existing: String },

    #[error("text generation timed out")]
    GenerationTimeout,

    #[error("text generation service unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("text generation failed: {0}")]
    GenerationFailed(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
