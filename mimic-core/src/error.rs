//! Errors in the library.
use crate::controller::SnapshotSlot;
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
///
/// Functions of this crate return [`anyhow::Result`]. Callers that need to react to a
/// specific failure recover it with `err.downcast_ref::<MimicError>()`.
#[derive(Error, Debug)]
pub enum MimicError {
    /// A raw frame could not be normalized.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// A snapshot slot was restored before anything was stored in it.
    #[error("No snapshot in the {0:?} slot")]
    NoSnapshot(SnapshotSlot),

    /// More records than the destination buffer can hold.
    #[error("Capacity exceeded: {requested} records do not fit into a buffer of capacity {capacity}")]
    CapacityExceeded {
        /// Capacity of the destination buffer.
        capacity: usize,

        /// Number of records requested.
        requested: usize,
    },

    /// A logical record range outside of the valid records of a buffer.
    #[error("Invalid range {start}..{end}: valid records are {valid_start}..{valid_end}")]
    InvalidRange {
        /// Start of the requested range.
        start: usize,

        /// End of the requested range (exclusive).
        end: usize,

        /// Oldest valid logical index.
        valid_start: usize,

        /// One past the newest valid logical index.
        valid_end: usize,
    },

    /// Reading or writing a buffer directory failed.
    #[error("Persistence error at {path:?}: {source}")]
    Persistence {
        /// The file or directory involved.
        path: PathBuf,

        /// Underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A keystroke not in the vocabulary.
    #[error("Unmapped input: {0:?}")]
    UnmappedInput(char),
}

impl MimicError {
    /// Wraps an I/O or serialization failure at `path`.
    pub fn persistence(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Persistence {
            path: path.into(),
            source: source.into(),
        }
    }
}
