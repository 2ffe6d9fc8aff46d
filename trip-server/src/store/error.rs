//! Storage error types.

/// Errors from the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id in the collection
    #[error("{collection} {id} not found")]
    NotFound { collection: &'static str, id: u64 },

    /// The record changed since it was read
    #[error("{collection} {id} was modified concurrently")]
    Conflict { collection: &'static str, id: u64 },

    /// Snapshot file could not be read or written
    #[error("snapshot I/O error: {message}")]
    Io { message: String },

    /// Snapshot file contents were not valid
    #[error("snapshot format error: {message}")]
    Format { message: String },
}
