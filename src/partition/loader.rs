use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::codec::CodecRegistry;
use crate::constants::columns::CREATION_TIME;
use crate::diagnostics::{FailureStage, PartitionFailure};
use crate::partition::{Partition, PartitionRef};
use crate::storage::ObjectStore;
use crate::table::{Cell, Table};

/// Fetches and decodes partitions, isolating failures per partition.
pub struct PartitionLoader {
    store: Arc<dyn ObjectStore>,
    codecs: CodecRegistry,
}

impl PartitionLoader {
    /// Loader reading from `store` and decoding with `codecs`.
    pub fn new(store: Arc<dyn ObjectStore>, codecs: CodecRegistry) -> Self {
        Self { store, codecs }
    }

    /// Load one partition.
    ///
    /// Never fails: a fetch or decode error yields a partition with zero rows
    /// and a `PartitionFailure`, and is logged as a warning.
    pub fn load(&self, reference: &PartitionRef) -> Partition {
        match self.try_load(reference) {
            Ok(table) => {
                debug!(
                    "[trendlines:load] object='{}' rows={} label={:?}",
                    reference.object,
                    table.len(),
                    reference.bucket_label
                );
                Partition {
                    reference: reference.clone(),
                    table,
                    failure: None,
                }
            }
            Err(failure) => {
                warn!(
                    "[trendlines:load] skipping partition '{}' ({:?}): {}",
                    failure.object, failure.stage, failure.reason
                );
                Partition {
                    reference: reference.clone(),
                    table: Table::new(),
                    failure: Some(failure),
                }
            }
        }
    }

    /// Load every reference, optionally on the rayon pool.
    ///
    /// All loads are joined before returning and the output order matches
    /// `references` regardless of `parallel`.
    pub fn load_all(&self, references: &[PartitionRef], parallel: bool) -> Vec<Partition> {
        if parallel && references.len() > 1 {
            references
                .par_iter()
                .map(|reference| self.load(reference))
                .collect()
        } else {
            references
                .iter()
                .map(|reference| self.load(reference))
                .collect()
        }
    }

    fn try_load(&self, reference: &PartitionRef) -> Result<Table, PartitionFailure> {
        let failure = |stage: FailureStage, reason: String| PartitionFailure {
            object: reference.object.clone(),
            stage,
            reason,
        };
        let decoder = self.codecs.for_object(&reference.object).ok_or_else(|| {
            failure(
                FailureStage::UnsupportedFormat,
                format!("no decoder registered for extension '{}'", reference.extension),
            )
        })?;
        let data = self
            .store
            .read_object(&reference.object)
            .map_err(|err| failure(FailureStage::Fetch, err.to_string()))?;
        let mut table = decoder
            .decode(&reference.object, &data)
            .map_err(|err| failure(FailureStage::Decode, err.to_string()))?;

        if let Some(label) = &reference.bucket_label {
            attach_creation_time(&mut table, label);
        }
        Ok(table)
    }
}

/// Tag rows lacking a native `creation_time` column with the bucket label.
fn attach_creation_time(table: &mut Table, label: &str) {
    table.declare_column(CREATION_TIME);
    for row in table.rows_mut() {
        let has_native = row
            .get(CREATION_TIME)
            .is_some_and(|cell| !cell.is_null());
        if !has_native {
            row.insert(CREATION_TIME.to_string(), Cell::Text(label.to_string()));
        }
    }
}
