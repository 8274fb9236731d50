//! Append-only reward log.
//!
//! Every mastery (and special-word addition) leaves a reward row behind.
//! Rows are never updated or deleted except as part of a full student purge.

use crate::error::{PathwayError, Result};
use crate::store::PathwayStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What earned the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    WordMastered,
    SpecialWordMastered,
    SpecialWordAdded,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardKind::WordMastered => "word_mastered",
            RewardKind::SpecialWordMastered => "special_word_mastered",
            RewardKind::SpecialWordAdded => "special_word_added",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "special_word_mastered" => RewardKind::SpecialWordMastered,
            "special_word_added" => RewardKind::SpecialWordAdded,
            _ => RewardKind::WordMastered,
        }
    }
}

/// The rewarded item: exactly one of a catalog word or a special word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardTarget {
    Word(i64),
    Special(i64),
}

/// One logged reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardEvent {
    pub id: i64,
    pub student: String,
    pub word_id: Option<i64>,
    pub special_word_id: Option<i64>,
    pub kind: RewardKind,
    pub reward_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Insert helper shared with the status-transition paths, which already hold
/// the connection lock.
pub(crate) fn insert_reward(
    conn: &Connection,
    student: &str,
    target: RewardTarget,
    kind: RewardKind,
    notes: &str,
) -> Result<i64> {
    let (word_id, special_word_id) = match target {
        RewardTarget::Word(id) => (Some(id), None),
        RewardTarget::Special(id) => (None, Some(id)),
    };
    conn.execute(
        r#"
        INSERT INTO rewards (student_name, word_id, special_word_id, reward_type, reward_date, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
        params![student, word_id, special_word_id, kind.as_str(), Utc::now(), notes],
    )?;
    let id = conn.last_insert_rowid();
    debug!(student, kind = kind.as_str(), "reward recorded");
    Ok(id)
}

impl PathwayStore {
    /// Append a reward event. The target enforces the exactly-one-of rule at
    /// the type level; the schema CHECK backs it up.
    pub fn record_reward(
        &self,
        student: &str,
        target: RewardTarget,
        kind: RewardKind,
        notes: &str,
    ) -> Result<i64> {
        let student = student.trim();
        if student.is_empty() {
            return Err(PathwayError::MissingField("student"));
        }
        let conn = self.conn.lock().unwrap();
        insert_reward(&conn, student, target, kind, notes)
    }

    /// All reward events for a student, most recent first.
    pub fn rewards_for(&self, student: &str) -> Result<Vec<RewardEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, student_name, word_id, special_word_id, reward_type, reward_date, notes
            FROM rewards
            WHERE student_name = ?
            ORDER BY reward_date DESC, id DESC
            "#,
        )?;
        let rows = stmt.query_map(params![student.trim()], |row| {
            Ok(RewardEvent {
                id: row.get(0)?,
                student: row.get(1)?,
                word_id: row.get(2)?,
                special_word_id: row.get(3)?,
                kind: RewardKind::from_str(&row.get::<_, String>(4)?),
                reward_date: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_list() {
        let s = PathwayStore::open_in_memory().unwrap();
        let w = s.upsert_word("cat", 1).unwrap();

        s.record_reward("Amir", RewardTarget::Word(w.id), RewardKind::WordMastered, "")
            .unwrap();
        let events = s.rewards_for("Amir").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, RewardKind::WordMastered);
        assert_eq!(events[0].word_id, Some(w.id));
        assert_eq!(events[0].special_word_id, None);

        assert!(s.rewards_for("Nobody").unwrap().is_empty());
    }

    #[test]
    fn test_most_recent_first() {
        let s = PathwayStore::open_in_memory().unwrap();
        let a = s.upsert_word("cat", 1).unwrap();
        let b = s.upsert_word("dog", 2).unwrap();

        s.record_reward("Amir", RewardTarget::Word(a.id), RewardKind::WordMastered, "first")
            .unwrap();
        s.record_reward("Amir", RewardTarget::Word(b.id), RewardKind::WordMastered, "second")
            .unwrap();

        let events = s.rewards_for("Amir").unwrap();
        assert_eq!(events[0].notes.as_deref(), Some("second"));
        assert_eq!(events[1].notes.as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_student_rejected() {
        let s = PathwayStore::open_in_memory().unwrap();
        assert!(matches!(
            s.record_reward("", RewardTarget::Word(1), RewardKind::WordMastered, ""),
            Err(PathwayError::MissingField("student"))
        ));
    }

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in [
            RewardKind::WordMastered,
            RewardKind::SpecialWordMastered,
            RewardKind::SpecialWordAdded,
        ] {
            assert_eq!(RewardKind::from_str(kind.as_str()), kind);
        }
    }
}
