//! Location records.

use crate::domain::{Address, Coordinate, Location, LocationId};

use super::collection::{Collection, Record};
use super::error::StoreError;
use super::snapshot::SnapshotFile;

impl Record for Location {
    const COLLECTION: &'static str = "location";

    fn record_id(&self) -> u64 {
        self.id.get()
    }
}

/// Stored locations.
#[derive(Default)]
pub struct LocationStore {
    records: Collection<Location>,
}

impl LocationStore {
    /// An empty, memory-only store.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A store mirrored to a snapshot file.
    pub fn open(snapshot: SnapshotFile) -> Result<Self, StoreError> {
        Ok(Self {
            records: Collection::open(snapshot)?,
        })
    }

    /// Store a new, already geocoded location.
    pub async fn create(
        &self,
        name: String,
        address: Address,
        coordinate: Coordinate,
    ) -> Result<Location, StoreError> {
        self.records
            .insert_with(|id| Location::new(LocationId::new(id), name, address, coordinate))
            .await
    }

    /// Fetch a location.
    pub async fn get(&self, id: LocationId) -> Result<Location, StoreError> {
        self.records.get(id.get()).await
    }

    /// Replace a location's address.
    ///
    /// Coordinates are kept as geocoded at creation, so after an address
    /// change they may no longer match the address.
    pub async fn update_address(
        &self,
        id: LocationId,
        address: Address,
    ) -> Result<Location, StoreError> {
        let (location, ()) = self
            .records
            .update(id.get(), |location| {
                location.address = address;
                Ok::<_, StoreError>(())
            })
            .await?;
        Ok(location)
    }

    /// Remove a location.
    pub async fn delete(&self, id: LocationId) -> Result<Location, StoreError> {
        self.records.delete(id.get()).await
    }

    /// Number of stored locations.
    pub async fn len(&self) -> usize {
        self.records.len().await
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.is_empty().await
    }
}
