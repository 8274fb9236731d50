//! Rank to step/level mapping.
//!
//! The 2800-word pathway splits into 28 steps of 100 ranks, each step into
//! 5 levels of 20 ranks. Step and level are materialized once at import time
//! and never recomputed per query.

use crate::error::{PathwayError, Result};
use serde::{Deserialize, Serialize};

/// Highest rank in the curriculum (1 = most common word).
pub const MAX_RANK: u32 = 2800;
/// Number of steps on the pathway.
pub const MAX_STEP: u32 = 28;
/// Levels per step.
pub const MAX_LEVEL: u32 = 5;

const RANKS_PER_STEP: u32 = 100;
const RANKS_PER_LEVEL: u32 = 20;

/// A (step, level) bucket on the pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepLevel {
    pub step: u32,
    pub level: u32,
}

impl StepLevel {
    /// Validated constructor. Bucket bounds are checked before any lookup
    /// that takes a step/level pair.
    pub fn new(step: u32, level: u32) -> Result<Self> {
        if !(1..=MAX_STEP).contains(&step) || !(1..=MAX_LEVEL).contains(&level) {
            return Err(PathwayError::InvalidBucket { step, level });
        }
        Ok(Self { step, level })
    }

    /// First rank covered by this bucket.
    pub fn first_rank(&self) -> u32 {
        (self.step - 1) * RANKS_PER_STEP + (self.level - 1) * RANKS_PER_LEVEL + 1
    }

    /// Last rank covered by this bucket.
    pub fn last_rank(&self) -> u32 {
        self.first_rank() + RANKS_PER_LEVEL - 1
    }
}

impl std::fmt::Display for StepLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step {} Level {}", self.step, self.level)
    }
}

/// Map a global rank to its (step, level) bucket.
///
/// Pure and deterministic; ascending rank gives non-decreasing buckets.
pub fn step_level_of(rank: u32) -> Result<StepLevel> {
    if !(1..=MAX_RANK).contains(&rank) {
        return Err(PathwayError::RankOutOfRange(rank));
    }
    Ok(StepLevel {
        step: (rank - 1) / RANKS_PER_STEP + 1,
        level: ((rank - 1) % RANKS_PER_STEP) / RANKS_PER_LEVEL + 1,
    })
}
