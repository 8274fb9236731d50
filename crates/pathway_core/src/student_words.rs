//! Per-student word status ledger.
//!
//! Tracks which catalog and special words a student is working on. Each
//! (student, word) pair moves through {absent, learning, mastered}: added as
//! learning, flipped to mastered by hand, reverted, or removed outright.
//! There is no shortcut from absent straight to mastered.

use crate::error::{PathwayError, Result};
use crate::rewards::{insert_reward, RewardKind, RewardTarget};
use crate::store::{PathwayStore, RewardPolicy};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tracking status of a (student, word) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Learning,
    Mastered,
}

impl WordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::Learning => "learning",
            WordStatus::Mastered => "mastered",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "mastered" => WordStatus::Mastered,
            _ => WordStatus::Learning,
        }
    }
}

/// One special word to add by text.
#[derive(Debug, Clone, Default)]
pub struct SpecialWordEntry {
    pub text: String,
    pub notes: Option<String>,
}

impl SpecialWordEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), notes: None }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Per-entry outcome of a batch special-word add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SpecialWordOutcome {
    Added { special_word_id: i64 },
    AlreadyTracked { special_word_id: i64 },
    CatalogCollision { step: u32, level: u32 },
    Invalid { reason: String },
}

/// Aggregated result of a batch special-word add. The batch continues past
/// collisions and bad entries instead of failing as a whole.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpecialWordBatch {
    pub results: Vec<(String, SpecialWordOutcome)>,
}

impl SpecialWordBatch {
    pub fn added(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, o)| matches!(o, SpecialWordOutcome::Added { .. }))
            .count()
    }

    pub fn collisions(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, o)| matches!(o, SpecialWordOutcome::CatalogCollision { .. }))
            .count()
    }
}

fn require_student(student: &str) -> Result<&str> {
    let student = student.trim();
    if student.is_empty() {
        return Err(PathwayError::MissingField("student"));
    }
    Ok(student)
}

impl PathwayStore {
    /// Put catalog words on a student's learning list. Pairs that already
    /// exist (either status) are left alone. Returns how many rows were
    /// actually inserted.
    pub fn add_learning(&self, student: &str, word_ids: &[i64]) -> Result<usize> {
        let student = require_student(student)?;
        let conn = self.conn.lock().unwrap();

        let mut inserted = 0;
        for word_id in word_ids {
            inserted += conn.execute(
                "INSERT OR IGNORE INTO student_words (student_name, word_id, status) VALUES (?, ?, 'learning')",
                params![student, word_id],
            )?;
        }
        debug!(student, inserted, "added learning words");
        Ok(inserted)
    }

    /// Same as [`add_learning`](Self::add_learning) for the special-word
    /// namespace. New rows get an added timestamp.
    pub fn add_special_learning(&self, student: &str, special_word_ids: &[i64]) -> Result<usize> {
        let student = require_student(student)?;
        let conn = self.conn.lock().unwrap();

        let mut inserted = 0;
        for special_word_id in special_word_ids {
            inserted += conn.execute(
                r#"
                INSERT OR IGNORE INTO student_special_words (student_name, special_word_id, status, added_date)
                VALUES (?, ?, 'learning', ?)
                "#,
                params![student, special_word_id, Utc::now()],
            )?;
        }
        debug!(student, inserted, "added special learning words");
        Ok(inserted)
    }

    /// Drop a catalog word from the student's ledger. Deleting an absent pair
    /// is a successful no-op; the return value says whether a row existed.
    pub fn remove_learning(&self, student: &str, word_id: i64) -> Result<bool> {
        let student = require_student(student)?;
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM student_words WHERE student_name = ? AND word_id = ?",
            params![student, word_id],
        )?;
        Ok(removed > 0)
    }

    /// Drop a special word from the student's ledger.
    pub fn remove_special_learning(&self, student: &str, special_word_id: i64) -> Result<bool> {
        let student = require_student(student)?;
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM student_special_words WHERE student_name = ? AND special_word_id = ?",
            params![student, special_word_id],
        )?;
        Ok(removed > 0)
    }

    /// Current status of a tracked catalog word, if any.
    pub fn word_status(&self, student: &str, word_id: i64) -> Result<Option<WordStatus>> {
        let conn = self.conn.lock().unwrap();
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM student_words WHERE student_name = ? AND word_id = ?",
                params![student.trim(), word_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status.map(|s| WordStatus::from_str(&s)))
    }

    /// Current status of a tracked special word, if any.
    pub fn special_word_status(
        &self,
        student: &str,
        special_word_id: i64,
    ) -> Result<Option<WordStatus>> {
        let conn = self.conn.lock().unwrap();
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM student_special_words WHERE student_name = ? AND special_word_id = ?",
                params![student.trim(), special_word_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status.map(|s| WordStatus::from_str(&s)))
    }

    /// Transition a tracked catalog word between learning and mastered.
    ///
    /// Entering mastered logs a `word_mastered` reward; under the default
    /// [`RewardPolicy::OnTransition`] only an actual learning -> mastered flip
    /// emits one. Reverting to learning never emits. Untracked pairs are a
    /// no-op: there is no absent -> mastered shortcut. Returns whether a
    /// tracked row was updated.
    pub fn set_word_status(&self, student: &str, word_id: i64, status: WordStatus) -> Result<bool> {
        let student = require_student(student)?;
        let conn = self.conn.lock().unwrap();

        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM student_words WHERE student_name = ? AND word_id = ?",
                params![student, word_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current.map(|s| WordStatus::from_str(&s)) else {
            return Ok(false);
        };

        conn.execute(
            "UPDATE student_words SET status = ? WHERE student_name = ? AND word_id = ?",
            params![status.as_str(), student, word_id],
        )?;

        if status == WordStatus::Mastered && self.should_reward(current) {
            insert_reward(
                &conn,
                student,
                RewardTarget::Word(word_id),
                RewardKind::WordMastered,
                "Mastered word",
            )?;
            info!(student, word_id, "word mastered");
        }
        Ok(true)
    }

    /// Transition a tracked special word. Mastering stamps `mastered_date`
    /// and logs a `special_word_mastered` reward; reverting to learning
    /// clears the stamp and emits nothing.
    pub fn set_special_status(
        &self,
        student: &str,
        special_word_id: i64,
        status: WordStatus,
    ) -> Result<bool> {
        let student = require_student(student)?;
        let conn = self.conn.lock().unwrap();

        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM student_special_words WHERE student_name = ? AND special_word_id = ?",
                params![student, special_word_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current.map(|s| WordStatus::from_str(&s)) else {
            return Ok(false);
        };

        match status {
            WordStatus::Mastered => {
                conn.execute(
                    r#"
                    UPDATE student_special_words SET status = 'mastered', mastered_date = ?
                    WHERE student_name = ? AND special_word_id = ?
                    "#,
                    params![Utc::now(), student, special_word_id],
                )?;
                if self.should_reward(current) {
                    insert_reward(
                        &conn,
                        student,
                        RewardTarget::Special(special_word_id),
                        RewardKind::SpecialWordMastered,
                        "Mastered special word",
                    )?;
                    info!(student, special_word_id, "special word mastered");
                }
            }
            WordStatus::Learning => {
                conn.execute(
                    r#"
                    UPDATE student_special_words SET status = 'learning', mastered_date = NULL
                    WHERE student_name = ? AND special_word_id = ?
                    "#,
                    params![student, special_word_id],
                )?;
            }
        }
        Ok(true)
    }

    /// Add one special word by text for a student. Fails with
    /// [`PathwayError::CatalogCollision`] carrying the existing entry's
    /// bucket when the text is already a catalog word, unless `force` is set,
    /// in which case the word is tracked independently. Returns the special
    /// word id.
    pub fn add_special_word(
        &self,
        student: &str,
        text: &str,
        notes: Option<&str>,
        force: bool,
    ) -> Result<i64> {
        let student = require_student(student)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(PathwayError::MissingField("word"));
        }

        if !force {
            if let Some(existing) = self.find_word(text)? {
                return Err(PathwayError::CatalogCollision {
                    word: existing.word,
                    step: existing.step,
                    level: existing.level,
                });
            }
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO special_words (word, added_date, notes) VALUES (?, ?, ?)",
            params![text, Utc::now(), notes],
        )?;
        let special_word_id: i64 = conn.query_row(
            "SELECT id FROM special_words WHERE word = ?",
            params![text],
            |row| row.get(0),
        )?;

        let linked = conn.execute(
            r#"
            INSERT OR IGNORE INTO student_special_words (student_name, special_word_id, status, added_date)
            VALUES (?, ?, 'learning', ?)
            "#,
            params![student, special_word_id, Utc::now()],
        )?;
        if linked > 0 {
            insert_reward(
                &conn,
                student,
                RewardTarget::Special(special_word_id),
                RewardKind::SpecialWordAdded,
                "Added special word",
            )?;
        }
        Ok(special_word_id)
    }

    /// Batch special-word add. Collisions and bad entries become per-item
    /// outcomes so one bad word never sinks the rest of the batch.
    pub fn add_special_words(
        &self,
        student: &str,
        entries: &[SpecialWordEntry],
        force: bool,
    ) -> Result<SpecialWordBatch> {
        require_student(student)?;

        let mut batch = SpecialWordBatch::default();
        for entry in entries {
            let already = match self.find_special_word(&entry.text)? {
                Some(sp) => self
                    .special_word_status(student, sp.id)?
                    .map(|_| sp.id),
                None => None,
            };

            let outcome = if let Some(id) = already {
                SpecialWordOutcome::AlreadyTracked { special_word_id: id }
            } else {
                match self.add_special_word(student, &entry.text, entry.notes.as_deref(), force) {
                    Ok(id) => SpecialWordOutcome::Added { special_word_id: id },
                    Err(PathwayError::CatalogCollision { step, level, .. }) => {
                        SpecialWordOutcome::CatalogCollision { step, level }
                    }
                    Err(PathwayError::MissingField(field)) => SpecialWordOutcome::Invalid {
                        reason: format!("missing {}", field),
                    },
                    Err(e) => return Err(e),
                }
            };
            batch.results.push((entry.text.trim().to_string(), outcome));
        }
        Ok(batch)
    }

    fn should_reward(&self, previous: WordStatus) -> bool {
        match self.reward_policy {
            RewardPolicy::OnTransition => previous == WordStatus::Learning,
            RewardPolicy::EveryCall => true,
        }
    }
}
