use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::{watch, Mutex};
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::models::{NewRecord, Record, StoreError};
use crate::storage::journal::{read_journal, read_next_id, write_journal};
use crate::storage::{RecordStore, Snapshot, SnapshotSubscription};
use crate::types::RecordId;

/// Record store backed by a concurrent map, optionally mirrored to a CSV journal.
///
/// Mutations are serialized by an async lock. The journal is rewritten before
/// the in-memory state changes, so a failed write leaves both untouched.
/// Ids are never reused, not even after reopening a journal whose newest
/// records were deleted.
pub struct MemoryStore {
    records: DashMap<RecordId, Record>,
    next_id: AtomicU64,
    write_lock: Mutex<()>,
    snapshots: watch::Sender<Snapshot>,
    journal: Option<PathBuf>
}

impl MemoryStore {
    /// Creates an empty, purely in-memory store.
    pub fn new() -> Self {
        Self::from_records(Vec::new(), None, None)
    }

    /// Opens (or starts) the CSV journal at `path` and loads its records.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let reader_path = path.clone();

        let (records, next_id) = spawn_blocking(move || {
            Ok::<_, StoreError>((read_journal(&reader_path)?, read_next_id(&reader_path)?))
        })
            .await
            .map_err(|error| StoreError::Worker(error.to_string()))??;

        debug!("Loaded [{}] records from journal [{}]", records.len(), path.display());

        Ok(Self::from_records(records, next_id, Some(path)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn from_records(mut records: Vec<Record>, next_id: Option<RecordId>, journal: Option<PathBuf>) -> Self {
        sort_for_emission(&mut records);

        let after_largest = records.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        let next_id = next_id.map_or(after_largest, |stored| stored.max(after_largest));
        let map = records.iter().map(|record| (record.id, record.clone())).collect();
        let (snapshots, _) = watch::channel(Snapshot::from(records));

        Self {
            records: map,
            next_id: AtomicU64::new(next_id),
            write_lock: Mutex::new(()),
            snapshots,
            journal
        }
    }

    /// Orders `next`, writes it to the journal along with `next_id` if there is
    /// one, and hands it back as a snapshot.
    async fn persist(&self, mut next: Vec<Record>, next_id: RecordId) -> Result<Snapshot, StoreError> {
        sort_for_emission(&mut next);

        let next = match &self.journal {
            Some(path) => {
                let path = path.clone();

                spawn_blocking(move || write_journal(&path, &next, next_id).map(|_| next))
                    .await
                    .map_err(|error| StoreError::Worker(error.to_string()))??
            }
            None => next
        };

        Ok(Snapshot::from(next))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    async fn insert(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        let _guard = self.write_lock.lock().await;

        let id = self.next_id.load(Ordering::SeqCst);
        let record = record.into_record(id);

        let mut next = self.snapshot().to_vec();
        next.push(record.clone());
        let snapshot = self.persist(next, id + 1).await?;

        self.records.insert(id, record);
        self.next_id.store(id + 1, Ordering::SeqCst);
        self.snapshots.send_replace(snapshot);

        debug!("Record [{id}] inserted");

        Ok(id)
    }

    async fn update(&self, record: Record) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if !self.records.contains_key(&record.id) {
            return Err(StoreError::NotFound(record.id));
        }

        let next = self.snapshot().iter()
            .map(|existing| if existing.id == record.id { record.clone() } else { existing.clone() })
            .collect();
        let snapshot = self.persist(next, self.next_id.load(Ordering::SeqCst)).await?;

        let id = record.id;
        self.records.insert(id, record);
        self.snapshots.send_replace(snapshot);

        debug!("Record [{id}] updated");

        Ok(())
    }

    async fn delete(&self, record: &Record) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if !self.records.contains_key(&record.id) {
            debug!("Record [{}] already absent, nothing to delete", record.id);
            return Ok(());
        }

        let next = self.snapshot().iter()
            .filter(|existing| existing.id != record.id)
            .cloned()
            .collect();
        let snapshot = self.persist(next, self.next_id.load(Ordering::SeqCst)).await?;

        self.records.remove(&record.id);
        self.snapshots.send_replace(snapshot);

        debug!("Record [{}] deleted", record.id);

        Ok(())
    }

    fn get(&self, id: RecordId) -> Option<Record> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    fn observe_all(&self) -> SnapshotSubscription {
        SnapshotSubscription::new(self.snapshots.subscribe())
    }
}

/// Newest first; records sharing a timestamp are ordered by id, newest first.
fn sort_for_emission(records: &mut [Record]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

impl From<Vec<Record>> for MemoryStore {
    fn from(records: Vec<Record>) -> Self {
        Self::from_records(records, None, None)
    }
}
