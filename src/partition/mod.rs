//! Partition discovery, loading, and writing.
//!
//! Ownership model:
//! - `PartitionLocator` lists a platform's objects and derives `PartitionRef`s.
//! - `PartitionLoader` turns one `PartitionRef` into a `Partition`, isolating
//!   failures to that partition.
//! - `PartitionWriter` is the inverse used by ingestion glue and fixtures.

use crate::diagnostics::PartitionFailure;
use crate::table::Table;
use crate::types::{BucketLabel, Extension, ObjectName};

/// Partition listing.
pub mod locator;
/// Partition fetch and decode.
pub mod loader;
/// Partition encoding and naming.
pub mod writer;

pub use loader::PartitionLoader;
pub use locator::PartitionLocator;
pub use writer::PartitionWriter;

/// A located partition object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionRef {
    /// Full object name in the store.
    pub object: ObjectName,
    /// Lowercased extension used to pick a decoder.
    pub extension: Extension,
    /// Bucket label extracted from the name; `None` when the name does not
    /// follow the `creation_time=` convention.
    pub bucket_label: Option<BucketLabel>,
}

/// A loaded partition: its rows, or the reason it contributed none.
#[derive(Clone, Debug)]
pub struct Partition {
    /// Where the partition came from.
    pub reference: PartitionRef,
    /// Decoded rows; empty when loading failed.
    pub table: Table,
    /// Set when the partition could not be loaded.
    pub failure: Option<PartitionFailure>,
}

impl Partition {
    /// True if loading failed.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}
