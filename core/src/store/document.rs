use super::SandboxStore;
use crate::{
    error::SandboxResult,
    record::{Collection, Record},
};
use chrono::SecondsFormat;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;

impl SandboxStore {
    // ── Documents ─────────────────────────────────────────────────

    /// Insert every record, all or nothing. A record whose id already
    /// exists in the collection replaces the stored document.
    pub fn insert_many<R: Record>(
        &self,
        collection: Collection,
        records: &[R],
    ) -> SandboxResult<usize> {
        self.savepoint("insert_many", || {
            let mut stmt = self.conn.prepare(
                "INSERT OR REPLACE INTO document (collection, doc_id, occurred_at, body)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for r in records {
                let body = serde_json::to_string(r)?;
                let occurred_at = r
                    .occurred_at()
                    .to_rfc3339_opts(SecondsFormat::Millis, true);
                stmt.execute(params![collection.name(), r.id(), occurred_at, body])?;
            }
            Ok(records.len())
        })
    }

    /// Remove every document in `collection`; returns how many went.
    pub fn delete_many(&self, collection: Collection) -> SandboxResult<usize> {
        let n = self.conn.execute(
            "DELETE FROM document WHERE collection = ?1",
            params![collection.name()],
        )?;
        Ok(n)
    }

    pub fn count_documents(&self, collection: Collection) -> SandboxResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM document WHERE collection = ?1",
            params![collection.name()],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// All documents in `collection`, oldest first.
    pub fn find_all<T: DeserializeOwned>(&self, collection: Collection) -> SandboxResult<Vec<T>> {
        let mut stmt = self.conn.prepare(
            "SELECT body FROM document WHERE collection = ?1
             ORDER BY occurred_at ASC, doc_id ASC",
        )?;
        let bodies = stmt
            .query_map(params![collection.name()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        bodies
            .iter()
            .map(|b| serde_json::from_str(b).map_err(Into::into))
            .collect()
    }

    pub fn find_by_id<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> SandboxResult<Option<T>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM document WHERE collection = ?1 AND doc_id = ?2",
                params![collection.name(), id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match body {
            Some(b) => Ok(Some(serde_json::from_str(&b)?)),
            None => Ok(None),
        }
    }
}
