//! SQLite-backed pathway store.
//!
//! One connection behind a mutex; every operation is a short-lived statement
//! or transaction. Schema creation is idempotent, so `open` doubles as setup
//! on first run.

use crate::error::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// When mastery reward events are emitted.
///
/// The historical behavior re-inserted a reward row on every master call;
/// `OnTransition` emits exactly one event per actual learning -> mastered
/// transition and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewardPolicy {
    #[default]
    OnTransition,
    EveryCall,
}

/// Shared store for the word catalog and all per-student state.
pub struct PathwayStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
    pub(crate) reward_policy: RewardPolicy,
    db_path: Option<PathBuf>,
}

impl PathwayStore {
    /// Open or create the store at a specific path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            reward_policy: RewardPolicy::default(),
            db_path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store. Used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            reward_policy: RewardPolicy::default(),
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Override the reward emission policy.
    pub fn with_reward_policy(mut self, policy: RewardPolicy) -> Self {
        self.reward_policy = policy;
        self
    }

    /// Database path, if backed by a file.
    pub fn path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL UNIQUE,
                rank INTEGER NOT NULL CHECK(rank BETWEEN 1 AND 2800),
                step INTEGER NOT NULL CHECK(step BETWEEN 1 AND 28),
                level INTEGER NOT NULL CHECK(level BETWEEN 1 AND 5)
            );

            CREATE TABLE IF NOT EXISTS special_words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL UNIQUE,
                added_date TEXT NOT NULL,
                notes TEXT
            );

            CREATE TABLE IF NOT EXISTS student_words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_name TEXT NOT NULL,
                word_id INTEGER NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('learning','mastered')) DEFAULT 'learning',
                UNIQUE(student_name, word_id),
                FOREIGN KEY(word_id) REFERENCES words(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS student_special_words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_name TEXT NOT NULL,
                special_word_id INTEGER NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('learning','mastered')) DEFAULT 'learning',
                added_date TEXT NOT NULL,
                mastered_date TEXT,
                UNIQUE(student_name, special_word_id),
                FOREIGN KEY(special_word_id) REFERENCES special_words(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS student_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_name TEXT NOT NULL UNIQUE,
                current_step INTEGER NOT NULL DEFAULT 1 CHECK(current_step BETWEEN 1 AND 28),
                current_level INTEGER NOT NULL DEFAULT 1 CHECK(current_level BETWEEN 1 AND 5),
                last_updated TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rewards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_name TEXT NOT NULL,
                word_id INTEGER,
                special_word_id INTEGER,
                reward_type TEXT NOT NULL,
                reward_date TEXT NOT NULL,
                notes TEXT,
                CHECK ((word_id IS NOT NULL AND special_word_id IS NULL) OR
                       (word_id IS NULL AND special_word_id IS NOT NULL))
            );

            CREATE INDEX IF NOT EXISTS idx_words_rank ON words(rank);
            CREATE INDEX IF NOT EXISTS idx_words_step_level ON words(step, level);
            CREATE INDEX IF NOT EXISTS idx_student_words_student ON student_words(student_name);
            CREATE INDEX IF NOT EXISTS idx_special_words_word ON special_words(word);
            CREATE INDEX IF NOT EXISTS idx_student_special_words ON student_special_words(student_name, status);
            CREATE INDEX IF NOT EXISTS idx_rewards_student ON rewards(student_name);
            "#,
        )?;

        debug!("pathway schema ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pathway.db");
        let store = PathwayStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(&path));

        // Schema init is idempotent
        drop(store);
        let store = PathwayStore::open(&path).unwrap();
        assert!(store.all_words().unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_store() {
        let store = PathwayStore::open_in_memory().unwrap();
        assert!(store.path().is_none());
        assert!(store.all_words().unwrap().is_empty());
    }

    #[test]
    fn test_reward_policy_default() {
        let store = PathwayStore::open_in_memory().unwrap();
        assert_eq!(store.reward_policy, RewardPolicy::OnTransition);
        let store = store.with_reward_policy(RewardPolicy::EveryCall);
        assert_eq!(store.reward_policy, RewardPolicy::EveryCall);
    }
}
