//! Current pathway position per student.
//!
//! The pointer is purely navigational: it is set by hand and has no enforced
//! relationship to the learning set. Until the first explicit set, (1, 1) is
//! returned as a default value without a row ever being written.

use crate::error::{PathwayError, Result};
use crate::rank::StepLevel;
use crate::store::PathwayStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// A student's pathway position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub step: u32,
    pub level: u32,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for Progress {
    fn default() -> Self {
        Self { step: 1, level: 1, last_updated: None }
    }
}

impl PathwayStore {
    /// Current position, or the (1, 1) default when nothing was ever set.
    pub fn progress(&self, student: &str) -> Result<Progress> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT current_step, current_level, last_updated FROM student_progress WHERE student_name = ?",
                params![student.trim()],
                |row| {
                    Ok(Progress {
                        step: row.get(0)?,
                        level: row.get(1)?,
                        last_updated: Some(row.get(2)?),
                    })
                },
            )
            .optional()?;
        Ok(row.unwrap_or_default())
    }

    /// Move the pointer, bumping `last_updated`. Bucket bounds are validated
    /// first.
    pub fn set_progress(&self, student: &str, step: u32, level: u32) -> Result<()> {
        let student = student.trim();
        if student.is_empty() {
            return Err(PathwayError::MissingField("student"));
        }
        let sl = StepLevel::new(step, level)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO student_progress (student_name, current_step, current_level, last_updated)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(student_name) DO UPDATE SET
                current_step = excluded.current_step,
                current_level = excluded.current_level,
                last_updated = excluded.last_updated
            "#,
            params![student, sl.step, sl.level, Utc::now()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_without_row() {
        let s = PathwayStore::open_in_memory().unwrap();
        let p = s.progress("Amir").unwrap();
        assert_eq!((p.step, p.level), (1, 1));
        assert!(p.last_updated.is_none());
        // Reading the default must not create a student
        assert!(s.students().unwrap().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let s = PathwayStore::open_in_memory().unwrap();
        s.set_progress("Amir", 3, 2).unwrap();

        let p = s.progress("Amir").unwrap();
        assert_eq!((p.step, p.level), (3, 2));
        assert!(p.last_updated.is_some());

        s.set_progress("Amir", 28, 5).unwrap();
        let p = s.progress("Amir").unwrap();
        assert_eq!((p.step, p.level), (28, 5));
    }

    #[test]
    fn test_bounds_checked_before_upsert() {
        let s = PathwayStore::open_in_memory().unwrap();
        assert!(matches!(
            s.set_progress("Amir", 29, 1),
            Err(PathwayError::InvalidBucket { step: 29, level: 1 })
        ));
        assert!(matches!(
            s.set_progress("Amir", 1, 0),
            Err(PathwayError::InvalidBucket { .. })
        ));
        // Nothing was written
        assert!(s.students().unwrap().is_empty());
    }
}
