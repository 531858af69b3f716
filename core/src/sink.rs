//! Output sinks. A sink receives a whole dataset and either persists all
//! of it or returns an error; partial writes are never reported as success.

use crate::{
    error::SandboxResult,
    population::{IdOffsets, SandboxDataset},
    record::{Collection, Record},
    season::SeasonCalendar,
    store::SandboxStore,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Stored document counts per collection after a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub counts: Vec<(Collection, i64)>,
}

impl SinkReport {
    pub fn count(&self, collection: Collection) -> Option<i64> {
        self.counts
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, n)| *n)
    }
}

pub trait DatasetSink {
    /// Records of `collection` already held by the sink.
    fn stored_count(&self, collection: Collection) -> SandboxResult<usize>;

    /// Drop everything earlier runs left behind.
    fn clear(&mut self) -> SandboxResult<()>;

    /// Persist the dataset (and, where supported, the calendar).
    fn write(
        &mut self,
        dataset: &SandboxDataset,
        seasons: &SeasonCalendar,
    ) -> SandboxResult<SinkReport>;

    /// Clear unless `append`, then write.
    fn replace_or_append(
        &mut self,
        dataset: &SandboxDataset,
        seasons: &SeasonCalendar,
        append: bool,
    ) -> SandboxResult<SinkReport> {
        if !append {
            self.clear()?;
        }
        self.write(dataset, seasons)
    }
}

/// Clear the sink unless `append`, then write.
pub fn deliver(
    sink: &mut dyn DatasetSink,
    dataset: &SandboxDataset,
    seasons: &SeasonCalendar,
    append: bool,
) -> SandboxResult<SinkReport> {
    if !append {
        log::info!("append=false: clearing previous output");
    }
    sink.replace_or_append(dataset, seasons, append)
}

/// Where an appending run must start numbering so it extends, rather
/// than overwrites, what `sink` already holds. Ids are assumed dense
/// (`u00001..`, `t1..`), which holds for everything this crate writes.
pub fn append_offsets(sink: &dyn DatasetSink) -> SandboxResult<IdOffsets> {
    let offsets = IdOffsets {
        users: sink.stored_count(Collection::Users)?,
        transactions: sink.stored_count(Collection::Transactions)?,
        sessions: sink.stored_count(Collection::Sessions)?,
        onboarding: sink.stored_count(Collection::Onboarding)?,
    };
    log::info!("append=true: continuing after {offsets:?}");
    Ok(offsets)
}

// ── Document store ──────────────────────────────────────────────

pub struct StoreSink<'a> {
    store: &'a SandboxStore,
}

impl<'a> StoreSink<'a> {
    pub fn new(store: &'a SandboxStore) -> Self {
        Self { store }
    }
}

impl DatasetSink for StoreSink<'_> {
    fn stored_count(&self, collection: Collection) -> SandboxResult<usize> {
        Ok(self.store.count_documents(collection)? as usize)
    }

    /// One transaction: a failed write leaves the previous data intact.
    fn replace_or_append(
        &mut self,
        dataset: &SandboxDataset,
        seasons: &SeasonCalendar,
        append: bool,
    ) -> SandboxResult<SinkReport> {
        let store = self.store;
        store.atomically(|| {
            if !append {
                self.clear()?;
            }
            self.write(dataset, seasons)
        })
    }

    fn clear(&mut self) -> SandboxResult<()> {
        for collection in Collection::ALL {
            let n = self.store.delete_many(collection)?;
            log::debug!("{}: deleted {n}", collection.name());
        }
        Ok(())
    }

    fn write(
        &mut self,
        dataset: &SandboxDataset,
        seasons: &SeasonCalendar,
    ) -> SandboxResult<SinkReport> {
        self.store.insert_many(Collection::Seasons, seasons.seasons())?;
        self.store.insert_many(Collection::Users, &dataset.users)?;
        self.store.insert_many(Collection::Sessions, &dataset.sessions)?;
        self.store.insert_many(Collection::FeatureLogs, &dataset.events)?;
        self.store
            .insert_many(Collection::Transactions, &dataset.transactions)?;
        self.store.insert_many(Collection::Onboarding, &dataset.onboarding)?;

        let counts = Collection::ALL
            .iter()
            .map(|&c| Ok((c, self.store.count_documents(c)?)))
            .collect::<SandboxResult<Vec<_>>>()?;
        Ok(SinkReport { counts })
    }
}

// ── JSON files ──────────────────────────────────────────────────

/// Writes one pretty-printed JSON array per collection into `dir`.
/// Existing files are merged by `id` (a new record replaces an old one
/// with the same id) and re-sorted by time, so appending runs accumulate.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.generated.json", collection.name()))
    }

    /// Collections this sink writes. The calendar is an input file in
    /// the same directory and is never rewritten.
    pub const COLLECTIONS: [Collection; 5] = [
        Collection::Users,
        Collection::FeatureLogs,
        Collection::Transactions,
        Collection::Sessions,
        Collection::Onboarding,
    ];

    fn write_collection<R: Record>(
        &self,
        collection: Collection,
        records: &[R],
    ) -> SandboxResult<i64> {
        let path = self.path_for(collection);
        let existing = read_array(&path)?;
        let incoming = records
            .iter()
            .map(|r| Ok((r.id().to_string(), r.occurred_at(), serde_json::to_value(r)?)))
            .collect::<SandboxResult<Vec<_>>>()?;
        let merged = merge_by_id(existing, incoming);
        let len = merged.len() as i64;
        std::fs::write(&path, serde_json::to_string_pretty(&merged)?)?;
        log::debug!("{}: wrote {len} records", path.display());
        Ok(len)
    }
}

impl DatasetSink for FileSink {
    fn stored_count(&self, collection: Collection) -> SandboxResult<usize> {
        Ok(read_array(&self.path_for(collection))?.len())
    }

    fn clear(&mut self) -> SandboxResult<()> {
        for collection in Self::COLLECTIONS {
            let path = self.path_for(collection);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn write(
        &mut self,
        dataset: &SandboxDataset,
        _seasons: &SeasonCalendar,
    ) -> SandboxResult<SinkReport> {
        std::fs::create_dir_all(&self.dir)?;
        let counts = vec![
            (
                Collection::Users,
                self.write_collection(Collection::Users, &dataset.users)?,
            ),
            (
                Collection::FeatureLogs,
                self.write_collection(Collection::FeatureLogs, &dataset.events)?,
            ),
            (
                Collection::Transactions,
                self.write_collection(Collection::Transactions, &dataset.transactions)?,
            ),
            (
                Collection::Sessions,
                self.write_collection(Collection::Sessions, &dataset.sessions)?,
            ),
            (
                Collection::Onboarding,
                self.write_collection(Collection::Onboarding, &dataset.onboarding)?,
            ),
        ];
        Ok(SinkReport { counts })
    }
}

/// Existing records in `path` as `(id, time, value)`; a missing file is
/// an empty collection.
fn read_array(path: &Path) -> SandboxResult<Vec<(String, Option<DateTime<Utc>>, Value)>> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let values: Vec<Value> = serde_json::from_str(&text)?;
    Ok(values
        .into_iter()
        .map(|v| {
            let id = match v.get("id") {
                Some(Value::String(s)) => s.clone(),
                _ => v.to_string(),
            };
            let at = time_of(&v);
            (id, at, v)
        })
        .collect())
}

/// First recognisable timestamp field of a stored record.
fn time_of(v: &Value) -> Option<DateTime<Utc>> {
    const FIELDS: [&str; 6] = [
        "timestamp",
        "createdAt",
        "startedAt",
        "updatedAt",
        "joinedAt",
        "startDate",
    ];
    FIELDS.iter().find_map(|f| {
        let s = v.get(*f)?.as_str()?;
        DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
            })
    })
}

fn merge_by_id(
    existing: Vec<(String, Option<DateTime<Utc>>, Value)>,
    incoming: Vec<(String, DateTime<Utc>, Value)>,
) -> Vec<Value> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<(Option<DateTime<Utc>>, Value)> = Vec::new();
    let all = existing
        .into_iter()
        .chain(incoming.into_iter().map(|(id, at, v)| (id, Some(at), v)));
    for (id, at, value) in all {
        match index.get(&id) {
            Some(&slot) => merged[slot] = (at, value),
            None => {
                index.insert(id, merged.len());
                merged.push((at, value));
            }
        }
    }
    // Stable: records without a time keep their relative order, first.
    merged.sort_by_key(|(at, _)| *at);
    merged.into_iter().map(|(_, v)| v).collect()
}
