//! Pathway Core - vocabulary curriculum progress tracking.
//!
//! Tracks a learner's way through the 2800-word pathway (28 steps of 100
//! ranks, 5 levels of 20 ranks each), keeps a per-student ledger of learning
//! and mastered words, logs reward events, and can ask a local LLM for a
//! story or quiz built from the learner's current vocabulary.
//!
//! The HTTP/CLI presentation layer lives elsewhere; this crate exposes the
//! read and write contracts it consumes.

pub mod catalog;
pub mod error;
pub mod generate;
pub mod importer;
pub mod progress;
pub mod rank;
pub mod render;
pub mod rewards;
pub mod store;
pub mod student_words;
pub mod views;

pub use catalog::{SpecialWord, Word};
pub use error::{PathwayError, Result};
pub use generate::{GenerationConfig, GenerationMode, TextGenerator};
pub use importer::ImportReport;
pub use progress::Progress;
pub use rank::{step_level_of, StepLevel, MAX_LEVEL, MAX_RANK, MAX_STEP};
pub use render::render_learning_list;
pub use rewards::{RewardEvent, RewardKind, RewardTarget};
pub use store::{PathwayStore, RewardPolicy};
pub use student_words::{
    SpecialWordBatch, SpecialWordEntry, SpecialWordOutcome, WordStatus,
};
pub use views::{LearningEntry, SpecialWordView, StudentPurge};
