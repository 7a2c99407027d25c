use serde::Serialize;

use crate::types::ObjectName;

/// Step at which an isolated partition failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The store could not return the object's bytes.
    Fetch,
    /// The bytes could not be decoded into a table.
    Decode,
    /// No decoder is registered for the object's extension.
    UnsupportedFormat,
}

/// One partition that contributed zero rows because it could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartitionFailure {
    /// Object that failed to load.
    pub object: ObjectName,
    /// Step that failed.
    pub stage: FailureStage,
    /// Underlying error text.
    pub reason: String,
}

/// Best-effort accounting for one platform load.
///
/// Every recovered problem lands here so callers can render a warning state
/// instead of an unexplained gap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadDiagnostics {
    /// Partitions returned by the locator.
    pub partitions_located: usize,
    /// Partitions fetched and decoded successfully (possibly with zero rows).
    pub partitions_loaded: usize,
    /// Located partitions whose name carries no bucket label.
    pub unlabeled_partitions: usize,
    /// Rows read across all loaded partitions.
    pub rows_read: usize,
    /// Rows dropped by the normalizer for a missing or unparsable timestamp.
    pub unparsed_timestamps: usize,
    /// Non-null values in numeric columns that are not finite numbers
    /// (e.g. `"n/a"`). They are skipped by aggregation, not averaged.
    pub non_numeric_values: usize,
    /// Isolated fetch/decode failures.
    pub failures: Vec<PartitionFailure>,
}

impl LoadDiagnostics {
    /// Rows that survived normalization.
    pub fn rows_kept(&self) -> usize {
        self.rows_read.saturating_sub(self.unparsed_timestamps)
    }

    /// True if anything was recovered from rather than loaded cleanly.
    pub fn has_warnings(&self) -> bool {
        !self.failures.is_empty() || self.unparsed_timestamps > 0 || self.non_numeric_values > 0
    }

    /// One-line summary suitable for logs and text reports.
    pub fn summary(&self) -> String {
        format!(
            "partitions={}/{} failed={} unlabeled={} rows={} dropped_rows={} non_numeric={}",
            self.partitions_loaded,
            self.partitions_located,
            self.failures.len(),
            self.unlabeled_partitions,
            self.rows_read,
            self.unparsed_timestamps,
            self.non_numeric_values
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_counts() {
        let diagnostics = LoadDiagnostics {
            partitions_located: 3,
            partitions_loaded: 2,
            unlabeled_partitions: 1,
            rows_read: 5,
            unparsed_timestamps: 2,
            non_numeric_values: 0,
            failures: vec![PartitionFailure {
                object: "x".into(),
                stage: FailureStage::Decode,
                reason: "bad".into(),
            }],
        };
        assert_eq!(diagnostics.rows_kept(), 3);
        assert!(diagnostics.has_warnings());
        assert_eq!(
            diagnostics.summary(),
            "partitions=2/3 failed=1 unlabeled=1 rows=5 dropped_rows=2 non_numeric=0"
        );
        assert!(!LoadDiagnostics::default().has_warnings());

        let skipped_values = LoadDiagnostics {
            non_numeric_values: 1,
            ..LoadDiagnostics::default()
        };
        assert!(skipped_values.has_warnings());
    }
}
