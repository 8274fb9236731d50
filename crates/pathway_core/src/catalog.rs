//! Word catalog queries.
//!
//! The 2800-word catalog is shared reference data: words are keyed by their
//! text, carry a unique rank, and hold the (step, level) bucket computed from
//! that rank at import time. Special words live in their own namespace for
//! learner-specific vocabulary outside the fixed list.

use crate::error::{PathwayError, Result};
use crate::rank::{step_level_of, StepLevel};
use crate::store::PathwayStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// A canonical catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub word: String,
    pub rank: u32,
    pub step: u32,
    pub level: u32,
}

/// A learner-specific word outside the 2800-word catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialWord {
    pub id: i64,
    pub word: String,
    pub added_date: DateTime<Utc>,
    pub notes: Option<String>,
}

fn word_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        word: row.get(1)?,
        rank: row.get(2)?,
        step: row.get(3)?,
        level: row.get(4)?,
    })
}

fn special_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SpecialWord> {
    Ok(SpecialWord {
        id: row.get(0)?,
        word: row.get(1)?,
        added_date: row.get(2)?,
        notes: row.get(3)?,
    })
}

impl PathwayStore {
    /// Insert or update a catalog word. Text is the natural key: re-importing
    /// an existing word overwrites its rank and bucket. Fails if a different
    /// word already holds the rank, since two words sharing a rank would
    /// break curriculum ordering.
    pub fn upsert_word(&self, word: &str, rank: u32) -> Result<Word> {
        let word = word.trim();
        if word.is_empty() {
            return Err(PathwayError::MissingField("word"));
        }
        let sl = step_level_of(rank)?;

        let conn = self.conn.lock().unwrap();

        let holder: Option<String> = conn
            .query_row(
                "SELECT word FROM words WHERE rank = ? AND word <> ?",
                params![rank, word],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = holder {
            return Err(PathwayError::DuplicateRank { rank, existing });
        }

        conn.execute(
            r#"
            INSERT INTO words (word, rank, step, level)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(word) DO UPDATE SET
                rank = excluded.rank,
                step = excluded.step,
                level = excluded.level
            "#,
            params![word, rank, sl.step, sl.level],
        )?;

        let entry = conn.query_row(
            "SELECT id, word, rank, step, level FROM words WHERE word = ?",
            params![word],
            word_from_row,
        )?;
        Ok(entry)
    }

    /// Words in one (step, level) bucket, ordered by rank ascending.
    /// Bucket bounds are validated before the lookup, so an out-of-range
    /// bucket is an error even when no words exist at all.
    pub fn words_in(&self, step: u32, level: u32) -> Result<Vec<Word>> {
        let sl = StepLevel::new(step, level)?;

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, word, rank, step, level FROM words WHERE step = ? AND level = ? ORDER BY rank",
        )?;
        let rows = stmt.query_map(params![sl.step, sl.level], word_from_row)?;

        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }

    /// Look up a catalog word by its text. Absence is a valid outcome, used
    /// to detect collisions before adding a special word.
    pub fn find_word(&self, word: &str) -> Result<Option<Word>> {
        let conn = self.conn.lock().unwrap();
        let entry = conn
            .query_row(
                "SELECT id, word, rank, step, level FROM words WHERE word = ?",
                params![word.trim()],
                word_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Full catalog in curriculum order.
    pub fn all_words(&self) -> Result<Vec<Word>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, word, rank, step, level FROM words ORDER BY step, level, rank")?;
        let rows = stmt.query_map([], word_from_row)?;

        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }

    /// Substring search over catalog words, alphabetical.
    pub fn search_words(&self, fragment: &str) -> Result<Vec<Word>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, word, rank, step, level FROM words WHERE word LIKE ? ORDER BY word",
        )?;
        let pattern = format!("%{}%", fragment.trim());
        let rows = stmt.query_map(params![pattern], word_from_row)?;

        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }

    /// Look up a special word by its text.
    pub fn find_special_word(&self, word: &str) -> Result<Option<SpecialWord>> {
        let conn = self.conn.lock().unwrap();
        let entry = conn
            .query_row(
                "SELECT id, word, added_date, notes FROM special_words WHERE word = ?",
                params![word.trim()],
                special_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// All special words ever added, alphabetical.
    pub fn all_special_words(&self) -> Result<Vec<SpecialWord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, word, added_date, notes FROM special_words ORDER BY word")?;
        let rows = stmt.query_map([], special_from_row)?;

        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PathwayStore {
        PathwayStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_upsert_computes_bucket() {
        let s = store();
        let cat = s.upsert_word("cat", 1).unwrap();
        assert_eq!(cat.step, 1);
        assert_eq!(cat.level, 1);

        let far = s.upsert_word("galaxy", 2800).unwrap();
        assert_eq!(far.step, 28);
        assert_eq!(far.level, 5);
    }

    #[test]
    fn test_upsert_is_keyed_by_text() {
        let s = store();
        let first = s.upsert_word("cat", 1).unwrap();
        let moved = s.upsert_word("cat", 150).unwrap();
        assert_eq!(first.id, moved.id);
        assert_eq!(moved.rank, 150);
        assert_eq!(moved.step, 2);
        assert_eq!(moved.level, 3);
        assert_eq!(s.all_words().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_rank_rejected() {
        let s = store();
        s.upsert_word("cat", 1).unwrap();
        let err = s.upsert_word("dog", 1).unwrap_err();
        assert!(matches!(
            err,
            PathwayError::DuplicateRank { rank: 1, ref existing } if existing == "cat"
        ));
        // The same word re-imported at its own rank is fine
        s.upsert_word("cat", 1).unwrap();
    }

    #[test]
    fn test_rank_bounds() {
        let s = store();
        assert!(matches!(
            s.upsert_word("zero", 0),
            Err(PathwayError::RankOutOfRange(0))
        ));
        assert!(matches!(
            s.upsert_word("far", 2801),
            Err(PathwayError::RankOutOfRange(2801))
        ));
        assert!(matches!(
            s.upsert_word("  ", 5),
            Err(PathwayError::MissingField("word"))
        ));
    }

    #[test]
    fn test_words_in_validates_before_lookup() {
        let s = store();
        assert!(matches!(
            s.words_in(0, 1),
            Err(PathwayError::InvalidBucket { step: 0, level: 1 })
        ));
        assert!(matches!(s.words_in(1, 6), Err(PathwayError::InvalidBucket { .. })));
        // Valid but empty bucket is an empty list, not an error
        assert!(s.words_in(28, 5).unwrap().is_empty());
    }

    #[test]
    fn test_words_in_ordered_by_rank() {
        let s = store();
        s.upsert_word("the", 3).unwrap();
        s.upsert_word("a", 1).unwrap();
        s.upsert_word("of", 2).unwrap();
        s.upsert_word("elsewhere", 21).unwrap();

        let bucket: Vec<String> = s
            .words_in(1, 1)
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(bucket, vec!["a", "of", "the"]);
    }

    #[test]
    fn test_find_word_absent_is_none() {
        let s = store();
        assert!(s.find_word("ghost").unwrap().is_none());
        s.upsert_word("ghost", 42).unwrap();
        assert_eq!(s.find_word("ghost").unwrap().unwrap().rank, 42);
    }

    #[test]
    fn test_search_words() {
        let s = store();
        s.upsert_word("cat", 1).unwrap();
        s.upsert_word("catalog", 2).unwrap();
        s.upsert_word("dog", 3).unwrap();
        let hits: Vec<String> = s
            .search_words("cat")
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(hits, vec!["cat", "catalog"]);
    }
}
