//! SQLite-backed document store.
//!
//! RULE: Only the store talks to the database.
//! Generators never see SQL; sinks call store methods.

use crate::error::SandboxResult;
mod document;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SandboxStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl SandboxStore {
    pub fn open(path: &str) -> SandboxResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SandboxResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn, path: None })
    }

    /// Database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SandboxResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_documents.sql"))?;
        Ok(())
    }

    /// Run `f` inside a savepoint: every write it makes is kept if it
    /// returns `Ok` and rolled back if it returns `Err`. Nests.
    pub fn atomically<T>(&self, f: impl FnOnce() -> SandboxResult<T>) -> SandboxResult<T> {
        self.savepoint("atomically", f)
    }

    fn savepoint<T>(&self, name: &str, f: impl FnOnce() -> SandboxResult<T>) -> SandboxResult<T> {
        self.conn.execute_batch(&format!("SAVEPOINT {name}"))?;
        match f() {
            Ok(value) => {
                self.conn.execute_batch(&format!("RELEASE {name}"))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"))
                {
                    log::error!("rollback of {name} failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        append: bool,
        started_at: &str,
    ) -> SandboxResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, append, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, seed as i64, version, append as i64, started_at],
        )?;
        Ok(())
    }

    /// Seed recorded for `run_id`, if the run exists.
    pub fn run_seed(&self, run_id: &str) -> SandboxResult<Option<u64>> {
        let seed = self
            .conn
            .query_row(
                "SELECT seed FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(seed.map(|s| s as u64))
    }

    pub fn run_count(&self) -> SandboxResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM run", [], |row| row.get(0))?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SandboxError, record::Collection, record::SyntheticUser};
    use chrono::{TimeZone, Utc};

    fn store() -> SandboxStore {
        let store = SandboxStore::in_memory().unwrap();
        store.migrate().unwrap();
        store
    }

    fn user(id: &str) -> SyntheticUser {
        SyntheticUser {
            id: id.to_string(),
            name: "Ada Obi".to_string(),
            email: "ada.obi1@example.com".to_string(),
            segment: "student".to_string(),
            joined_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            active: true,
        }
    }

    #[test]
    fn failed_batch_rolls_back_every_write() {
        let store = store();
        store.insert_many(Collection::Users, &[user("u00001")]).unwrap();

        let result: SandboxResult<()> = store.atomically(|| {
            store.delete_many(Collection::Users)?;
            store.insert_many(Collection::Users, &[user("u00002"), user("u00003")])?;
            Err(SandboxError::InvalidConfig("write failed".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.count_documents(Collection::Users).unwrap(), 1);
        let kept: Option<SyntheticUser> = store.find_by_id(Collection::Users, "u00001").unwrap();
        assert!(kept.is_some());
    }

    #[test]
    fn successful_batch_is_kept() {
        let store = store();
        store
            .atomically(|| store.insert_many(Collection::Users, &[user("u00001")]))
            .unwrap();
        assert_eq!(store.count_documents(Collection::Users).unwrap(), 1);
    }

    #[test]
    fn run_ids_are_unique() {
        let store = store();
        store.insert_run("r1", 42, "test", false, "2025-01-01T00:00:00Z").unwrap();
        assert!(store.insert_run("r1", 42, "test", true, "2025-01-01T00:00:00Z").is_err());
    }
}
