//! Read views composed over the catalog, ledgers, progress, and rewards.
//!
//! These queries hold no state of their own. The learning overview keeps the
//! contract the presentation layer relies on: catalog words first in
//! curriculum order, then special words in the order they were added.

use crate::error::{PathwayError, Result};
use crate::store::PathwayStore;
use crate::student_words::WordStatus;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;
use tracing::info;

/// One row of a student's learning list. `step`/`level` are `None` for
/// special words, which sit outside the curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningEntry {
    pub id: i64,
    pub word: String,
    pub step: Option<u32>,
    pub level: Option<u32>,
    pub status: WordStatus,
    pub special: bool,
}

/// A tracked special word with its full timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialWordView {
    pub special_word_id: i64,
    pub word: String,
    pub notes: Option<String>,
    pub status: WordStatus,
    pub added_date: DateTime<Utc>,
    pub mastered_date: Option<DateTime<Utc>>,
}

/// Row counts removed by a student purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StudentPurge {
    pub words: usize,
    pub special_words: usize,
    pub progress: usize,
    pub rewards: usize,
}

impl StudentPurge {
    pub fn total(&self) -> usize {
        self.words + self.special_words + self.progress + self.rewards
    }
}

impl PathwayStore {
    /// Everything the student is currently learning: catalog words ordered by
    /// (step, level, rank), then special words ordered by add time.
    pub fn learning_overview(&self, student: &str) -> Result<Vec<LearningEntry>> {
        let student = student.trim();
        let conn = self.conn.lock().unwrap();

        let mut entries = Vec::new();

        let mut stmt = conn.prepare(
            r#"
            SELECT w.id, w.word, w.step, w.level, sw.status
            FROM student_words sw
            JOIN words w ON sw.word_id = w.id
            WHERE sw.student_name = ? AND sw.status = 'learning'
            ORDER BY w.step, w.level, w.rank
            "#,
        )?;
        let rows = stmt.query_map(params![student], |row| {
            Ok(LearningEntry {
                id: row.get(0)?,
                word: row.get(1)?,
                step: Some(row.get(2)?),
                level: Some(row.get(3)?),
                status: WordStatus::from_str(&row.get::<_, String>(4)?),
                special: false,
            })
        })?;
        for row in rows {
            entries.push(row?);
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT sp.id, sp.word, sw.status
            FROM student_special_words sw
            JOIN special_words sp ON sw.special_word_id = sp.id
            WHERE sw.student_name = ? AND sw.status = 'learning'
            ORDER BY sw.added_date
            "#,
        )?;
        let rows = stmt.query_map(params![student], |row| {
            Ok(LearningEntry {
                id: row.get(0)?,
                word: row.get(1)?,
                step: None,
                level: None,
                status: WordStatus::from_str(&row.get::<_, String>(2)?),
                special: true,
            })
        })?;
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }

    /// All special words tracked for a student, both statuses, newest first.
    pub fn special_words_overview(&self, student: &str) -> Result<Vec<SpecialWordView>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT sw.special_word_id, sp.word, sp.notes, sw.status, sw.added_date, sw.mastered_date
            FROM student_special_words sw
            JOIN special_words sp ON sw.special_word_id = sp.id
            WHERE sw.student_name = ?
            ORDER BY sw.added_date DESC
            "#,
        )?;
        let rows = stmt.query_map(params![student.trim()], |row| {
            Ok(SpecialWordView {
                special_word_id: row.get(0)?,
                word: row.get(1)?,
                notes: row.get(2)?,
                status: WordStatus::from_str(&row.get::<_, String>(3)?),
                added_date: row.get(4)?,
                mastered_date: row.get(5)?,
            })
        })?;

        let mut views = Vec::new();
        for row in rows {
            views.push(row?);
        }
        Ok(views)
    }

    /// Every known student name. A student exists only by reference, so this
    /// is the distinct union over all per-student tables.
    pub fn students(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT student_name FROM student_words
            UNION SELECT student_name FROM student_special_words
            UNION SELECT student_name FROM student_progress
            UNION SELECT student_name FROM rewards
            ORDER BY student_name
            "#,
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Remove every trace of a student, atomically across all four
    /// per-student tables. Partial deletion would be a correctness bug, so
    /// the whole purge is one transaction.
    pub fn delete_student(&self, student: &str) -> Result<StudentPurge> {
        let student = student.trim();
        if student.is_empty() {
            return Err(PathwayError::MissingField("student"));
        }

        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;

        let purge = StudentPurge {
            words: tx.execute(
                "DELETE FROM student_words WHERE student_name = ?",
                params![student],
            )?,
            special_words: tx.execute(
                "DELETE FROM student_special_words WHERE student_name = ?",
                params![student],
            )?,
            progress: tx.execute(
                "DELETE FROM student_progress WHERE student_name = ?",
                params![student],
            )?,
            rewards: tx.execute(
                "DELETE FROM rewards WHERE student_name = ?",
                params![student],
            )?,
        };

        tx.commit()?;
        info!(student, removed = purge.total(), "student purged");
        Ok(purge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Progress;
    use crate::student_words::SpecialWordEntry;

    fn seeded() -> PathwayStore {
        let s = PathwayStore::open_in_memory().unwrap();
        s.upsert_word("cat", 1).unwrap();
        s.upsert_word("tree", 25).unwrap();
        s.upsert_word("river", 130).unwrap();
        s
    }

    #[test]
    fn test_learning_overview_ordering() {
        let s = seeded();
        let ids: Vec<i64> = s.all_words().unwrap().iter().map(|w| w.id).collect();
        // Insert out of curriculum order
        s.add_learning("Amir", &[ids[2], ids[0], ids[1]]).unwrap();
        s.add_special_word("Amir", "petrichor", None, false).unwrap();
        s.add_special_word("Amir", "sonder", None, false).unwrap();

        let overview = s.learning_overview("Amir").unwrap();
        let words: Vec<&str> = overview.iter().map(|e| e.word.as_str()).collect();
        // Catalog words first in (step, level, rank) order, then specials by add time
        assert_eq!(words, vec!["cat", "tree", "river", "petrichor", "sonder"]);
        assert!(!overview[0].special);
        assert_eq!(overview[0].step, Some(1));
        assert!(overview[3].special);
        assert_eq!(overview[3].step, None);
    }

    #[test]
    fn test_overview_excludes_mastered() {
        let s = seeded();
        let cat = s.find_word("cat").unwrap().unwrap().id;
        s.add_learning("Amir", &[cat]).unwrap();
        s.set_word_status("Amir", cat, WordStatus::Mastered).unwrap();
        assert!(s.learning_overview("Amir").unwrap().is_empty());
    }

    #[test]
    fn test_students_union() {
        let s = seeded();
        let cat = s.find_word("cat").unwrap().unwrap().id;
        s.add_learning("Amir", &[cat]).unwrap();
        s.set_progress("Yumi", 2, 1).unwrap();
        s.add_special_words("Noor", &[SpecialWordEntry::new("petrichor")], false)
            .unwrap();

        assert_eq!(s.students().unwrap(), vec!["Amir", "Noor", "Yumi"]);
    }

    #[test]
    fn test_delete_student_leaves_no_orphans() {
        let s = seeded();
        let cat = s.find_word("cat").unwrap().unwrap().id;
        s.add_learning("Amir", &[cat]).unwrap();
        s.set_word_status("Amir", cat, WordStatus::Mastered).unwrap();
        s.add_special_word("Amir", "petrichor", None, false).unwrap();
        s.set_progress("Amir", 4, 3).unwrap();

        // A second student must survive the purge untouched
        s.add_learning("Yumi", &[cat]).unwrap();

        let purge = s.delete_student("Amir").unwrap();
        assert_eq!(purge.words, 1);
        assert_eq!(purge.special_words, 1);
        assert_eq!(purge.progress, 1);
        assert_eq!(purge.rewards, 2); // one mastery, one special add
        assert_eq!(purge.total(), 5);

        assert!(s.learning_overview("Amir").unwrap().is_empty());
        assert!(s.rewards_for("Amir").unwrap().is_empty());
        assert_eq!(s.progress("Amir").unwrap(), Progress::default());
        assert_eq!(s.students().unwrap(), vec!["Yumi"]);

        // Purging again is a harmless no-op
        assert_eq!(s.delete_student("Amir").unwrap().total(), 0);
    }
}
