//! Trip records and the per-trip progression cursor.

use crate::domain::{LegRequest, Trip, TripId};

use super::collection::{Collection, Record};
use super::error::StoreError;
use super::snapshot::SnapshotFile;

impl Record for Trip {
    const COLLECTION: &'static str = "trip";

    fn record_id(&self) -> u64 {
        self.id.get()
    }
}

/// Stored trips.
#[derive(Default)]
pub struct TripStore {
    records: Collection<Trip>,
}

impl TripStore {
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

    /// Store a new trip. `build` receives the allocated id.
    pub async fn create<F>(&self, build: F) -> Result<Trip, StoreError>
    where
        F: FnOnce(TripId) -> Trip,
    {
        self.records.insert_with(|id| build(TripId::new(id))).await
    }

    /// Fetch a trip.
    pub async fn get(&self, id: TripId) -> Result<Trip, StoreError> {
        self.records.get(id.get()).await
    }

    /// Claim leg `leg` for booking.
    ///
    /// Fails with `Conflict` if the cursor is not at `leg`, the trip is
    /// complete, or another request already holds a claim.
    pub async fn claim_leg(&self, id: TripId, leg: usize) -> Result<Trip, StoreError> {
        let (trip, ()) = self
            .records
            .update(id.get(), |trip| {
                if trip.next_leg != leg || trip.is_complete() || trip.pending_leg.is_some() {
                    return Err(StoreError::Conflict {
                        collection: Trip::COLLECTION,
                        id: id.get(),
                    });
                }
                trip.pending_leg = Some(leg);
                Ok(())
            })
            .await?;
        Ok(trip)
    }

    /// Drop a claim on `leg` without advancing. No-op if the claim is gone.
    pub async fn release_leg(&self, id: TripId, leg: usize) -> Result<(), StoreError> {
        self.records
            .update(id.get(), |trip| {
                if trip.pending_leg == Some(leg) {
                    trip.pending_leg = None;
                }
                Ok::<_, StoreError>(())
            })
            .await?;
        Ok(())
    }

    /// Record the ride requested for leg `expected_leg` and advance the
    /// trip's cursor.
    ///
    /// Compare-and-swap: fails with `Conflict` if the cursor has moved
    /// since the caller read it.
    pub async fn record_leg_request(
        &self,
        id: TripId,
        expected_leg: usize,
        request: LegRequest,
    ) -> Result<Trip, StoreError> {
        let (trip, ()) = self
            .records
            .update(id.get(), |trip| {
                if trip.next_leg != expected_leg || trip.is_complete() {
                    return Err(StoreError::Conflict {
                        collection: Trip::COLLECTION,
                        id: id.get(),
                    });
                }
                trip.record_leg_request(request);
                Ok(())
            })
            .await?;
        Ok(trip)
    }

    /// Number of stored trips.
    pub async fn len(&self) -> usize {
        self.records.len().await
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.is_empty().await
    }
}
