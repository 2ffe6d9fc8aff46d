//! Generic record collection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::StoreError;
use super::snapshot::SnapshotFile;

/// A record that can live in a [`Collection`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used in errors and snapshot file names.
    const COLLECTION: &'static str;

    /// The record's id.
    fn record_id(&self) -> u64;
}

/// Records keyed by integer id.
///
/// Ids are allocated from an atomic sequence starting at 1 and are never
/// reused within a process. All mutations of a record happen under the
/// collection's write lock, so [`Collection::update`] is atomic with
/// respect to other updates.
pub struct Collection<T: Record> {
    records: RwLock<BTreeMap<u64, T>>,
    next_id: AtomicU64,
    snapshot: Option<SnapshotFile>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<T: Record> Collection<T> {
    /// An empty collection with no backing file.
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            snapshot: None,
        }
    }

    /// A collection mirrored to `snapshot`, loading any records already
    /// stored there. The id sequence resumes after the highest stored id.
    pub fn open(snapshot: SnapshotFile) -> Result<Self, StoreError> {
        let records: BTreeMap<u64, T> = snapshot
            .load::<T>()?
            .unwrap_or_default()
            .into_iter()
            .map(|r| (r.record_id(), r))
            .collect();

        let next_id = records.keys().next_back().map_or(1, |max| max + 1);

        info!(
            collection = T::COLLECTION,
            records = records.len(),
            path = %snapshot.path().display(),
            "opened collection"
        );

        Ok(Self {
            records: RwLock::new(records),
            next_id: AtomicU64::new(next_id),
            snapshot: Some(snapshot),
        })
    }

    /// Allocate an id, build the record with it and store it.
    pub async fn insert_with<F>(&self, build: F) -> Result<T, StoreError>
    where
        F: FnOnce(u64) -> T,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = build(id);

        let mut records = self.records.write().await;
        records.insert(id, record.clone());

        if let Err(e) = self.persist(&records) {
            records.remove(&id);
            return Err(e);
        }

        debug!(collection = T::COLLECTION, id, "inserted record");
        Ok(record)
    }

    /// Fetch a copy of a record.
    pub async fn get(&self, id: u64) -> Result<T, StoreError> {
        let records = self.records.read().await;
        records.get(&id).cloned().ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })
    }

    /// Atomically modify a record.
    ///
    /// `apply` runs on a copy of the record while the write lock is held.
    /// If it returns `Ok` the copy replaces the stored record; if it
    /// returns `Err` the stored record is left untouched.
    pub async fn update<R, E, F>(&self, id: u64, apply: F) -> Result<(T, R), E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut records = self.records.write().await;

        let mut updated = records.get(&id).cloned().ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })?;
        let outcome = apply(&mut updated)?;

        let previous = records.insert(id, updated.clone());
        if let Err(e) = self.persist(&records) {
            if let Some(previous) = previous {
                records.insert(id, previous);
            }
            return Err(e.into());
        }

        debug!(collection = T::COLLECTION, id, "updated record");
        Ok((updated, outcome))
    }

    /// Remove a record, returning it.
    pub async fn delete(&self, id: u64) -> Result<T, StoreError> {
        let mut records = self.records.write().await;

        let removed = records.remove(&id).ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })?;

        if let Err(e) = self.persist(&records) {
            records.insert(id, removed);
            return Err(e);
        }

        debug!(collection = T::COLLECTION, id, "deleted record");
        Ok(removed)
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn persist(&self, records: &BTreeMap<u64, T>) -> Result<(), StoreError> {
        match &self.snapshot {
            Some(file) => file.save(records.values()),
            None => Ok(()),
        }
    }
}
