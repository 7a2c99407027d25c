use std::io;

use thiserror::Error;

use crate::types::ObjectName;

/// Error type for argument misuse, storage access, and configuration failures.
///
/// Per-partition and per-row problems are not errors: they are recovered
/// locally and reported through [`crate::diagnostics::LoadDiagnostics`].
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Platform identifier failed validation.
    #[error("invalid platform identifier '{name}': {reason}")]
    InvalidPlatform {
        /// Rejected identifier.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Requested window has `start > end`.
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested start, RFC 3339.
        start: String,
        /// Requested end, RFC 3339.
        end: String,
    },
    /// Caller passed an argument the operation cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Listing or reading storage failed as a whole.
    #[error("storage location '{location}' is unavailable: {reason}")]
    StorageUnavailable {
        /// Prefix or object that could not be reached.
        location: ObjectName,
        /// Underlying failure.
        reason: String,
    },
    /// A partition already exists for that bucket.
    #[error("partition '{0}' already exists")]
    PartitionExists(ObjectName),
    /// Stored bytes could not be decoded.
    #[error("failed decoding '{object}': {reason}")]
    Decode {
        /// Object being decoded.
        object: ObjectName,
        /// Decoder message.
        reason: String,
    },
    /// Records could not be encoded.
    #[error("failed encoding partition '{object}': {reason}")]
    Encode {
        /// Object being written.
        object: ObjectName,
        /// Encoder message.
        reason: String,
    },
    /// Local filesystem error.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}
