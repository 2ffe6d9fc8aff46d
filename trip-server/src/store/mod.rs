//! Record storage for locations and trips.
//!
//! Each collection is an in-memory map guarded by an async lock, with ids
//! drawn from an atomic sequence. A collection can optionally mirror itself
//! to a JSON snapshot file, which is reloaded at startup.

mod collection;
mod error;
mod locations;
mod snapshot;
mod trips;

pub use collection::{Collection, Record};
pub use error::StoreError;
pub use locations::LocationStore;
pub use snapshot::SnapshotFile;
pub use trips::TripStore;
