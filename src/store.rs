use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use crate::record::ProgressRecord;
use crate::storage::Storage;

pub const PROGRESS_KEY: &str = "playback_progress.json";
pub const AUDIO_MIGRATION_KEY: &str = "audio_progress_migrated_v2";

const MAX_RECORDS: usize = 50;
const RETENTION_DAYS: i64 = 30;
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Bounded, locally persisted collection of [`ProgressRecord`]s.
///
/// The collection is read from storage once per process lifetime on first
/// access and served from memory afterwards; every mutation writes the full
/// blob back before returning. A blob that is missing or fails to
/// deserialize is treated as an empty collection: resume positions are a
/// local convenience cache, never worth failing a command over.
pub struct ProgressStore<S: Storage> {
    storage: S,
    records: Option<Vec<ProgressRecord>>,
}

impl<S: Storage> ProgressStore<S> {
    pub fn open(storage: S) -> Result<Self> {
        let mut store = Self {
            storage,
            records: None,
        };
        store.migrate()?;
        Ok(store)
    }

    /// One-time cleanup: album-level tracking superseded an older per-track
    /// scheme for audio, so stale audio records are dropped the first time
    /// a build with this scheme touches the store. Gated by a flag key so
    /// it runs exactly once.
    fn migrate(&mut self) -> Result<()> {
        if self.storage.load(AUDIO_MIGRATION_KEY)?.is_some() {
            return Ok(());
        }
        let records = self.records_mut();
        let before = records.len();
        records.retain(|record| !record.is_audio());
        if records.len() != before {
            self.persist()?;
        }
        self.storage.store(AUDIO_MIGRATION_KEY, b"1")
    }

    fn records_mut(&mut self) -> &mut Vec<ProgressRecord> {
        let storage = &self.storage;
        self.records.get_or_insert_with(|| load_records(storage))
    }

    fn persist(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec(self.records_mut())
            .context("failed to serialize progress records")?;
        self.storage.store(PROGRESS_KEY, &bytes)
    }

    /// Upsert keyed on (item, filename). A record that already qualifies as
    /// complete is not stored at all; saving one removes any previous entry
    /// for the same key. Upsert and delete-on-completion are deliberately
    /// one operation, not two.
    pub fn save(&mut self, record: ProgressRecord) -> Result<()> {
        let complete = record.is_complete();
        let records = self.records_mut();
        records.retain(|existing| *existing != record);
        if !complete {
            records.push(record);
        }
        self.prune();
        self.persist()
    }

    pub fn get(&mut self, item_identifier: &str, filename: &str) -> Option<ProgressRecord> {
        self.records_mut()
            .iter()
            .find(|record| {
                record.item_identifier == item_identifier && record.filename == filename
            })
            .cloned()
    }

    /// Most recently watched record for the item, across all filenames.
    pub fn latest(&mut self, item_identifier: &str) -> Option<ProgressRecord> {
        self.records_mut()
            .iter()
            .filter(|record| record.item_identifier == item_identifier)
            .max_by_key(|record| record.last_watched)
            .cloned()
    }

    pub fn remove(&mut self, item_identifier: &str, filename: &str) -> Result<()> {
        self.records_mut().retain(|record| {
            !(record.item_identifier == item_identifier && record.filename == filename)
        });
        self.persist()
    }

    pub fn remove_all(&mut self, item_identifier: &str) -> Result<()> {
        self.records_mut()
            .retain(|record| record.item_identifier != item_identifier);
        self.persist()
    }

    /// Drops the in-memory collection and the persisted blob key itself.
    pub fn clear(&mut self) -> Result<()> {
        self.records = Some(Vec::new());
        self.storage.remove(PROGRESS_KEY)
    }

    pub fn continue_watching(&mut self, limit: Option<usize>) -> Vec<ProgressRecord> {
        self.active_records(ProgressRecord::is_video, limit)
    }

    pub fn continue_listening(&mut self, limit: Option<usize>) -> Vec<ProgressRecord> {
        self.active_records(ProgressRecord::is_audio, limit)
    }

    fn active_records(
        &mut self,
        kind: fn(&ProgressRecord) -> bool,
        limit: Option<usize>,
    ) -> Vec<ProgressRecord> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let mut records: Vec<ProgressRecord> = self
            .records_mut()
            .iter()
            .filter(|record| kind(record) && !record.is_complete() && record.is_valid())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.last_watched.cmp(&a.last_watched));
        records.truncate(limit);
        records
    }

    pub fn has_resumable(&mut self, item_identifier: &str) -> bool {
        self.records_mut().iter().any(|record| {
            record.item_identifier == item_identifier
                && !record.is_complete()
                && record.has_resumable_progress()
        })
    }

    pub fn records(&mut self) -> &[ProgressRecord] {
        self.records_mut().as_slice()
    }

    /// Retention pass run after every save: drop records older than the
    /// retention window, then cap the collection at the most recent
    /// [`MAX_RECORDS`] entries. Ordering is by `last_watched` only, ties
    /// resolved by the stable sort.
    fn prune(&mut self) {
        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        let records = self.records_mut();
        records.retain(|record| record.last_watched >= cutoff);
        if records.len() > MAX_RECORDS {
            records.sort_by(|a, b| b.last_watched.cmp(&a.last_watched));
            records.truncate(MAX_RECORDS);
        }
    }
}

fn load_records<S: Storage>(storage: &S) -> Vec<ProgressRecord> {
    let bytes = match storage.load(PROGRESS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) | Err(_) => return Vec::new(),
    };
    serde_json::from_slice(&bytes).unwrap_or_default()
}
