//! Per-platform dataset assembly: merge partitions, then normalize time.

use crate::data::Platform;
use crate::diagnostics::LoadDiagnostics;
use crate::table::Table;

/// Row-wise partition concatenation.
pub mod merge;
/// Bucket label parsing.
pub mod normalize;

pub use merge::merge;
pub use normalize::normalize;

/// All rows loaded for one platform, with load diagnostics.
///
/// Built fresh per request and never persisted.
#[derive(Clone, Debug)]
pub struct PlatformDataset {
    /// Platform the rows were loaded for.
    pub platform: Platform,
    /// Merged rows across all partitions.
    pub table: Table,
    /// What was recovered from while loading.
    pub diagnostics: LoadDiagnostics,
}

impl PlatformDataset {
    /// Dataset with zero rows and no columns.
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            table: Table::new(),
            diagnostics: LoadDiagnostics::default(),
        }
    }

    /// True when no rows were loaded.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
