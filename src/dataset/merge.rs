use tracing::debug;

use crate::data::Platform;
use crate::dataset::PlatformDataset;
use crate::diagnostics::LoadDiagnostics;
use crate::partition::Partition;
use crate::table::Table;

/// Concatenate loaded partitions into one platform dataset.
///
/// Rows keep partition order; the column set is the union of every
/// partition's columns in first-seen order. Failed partitions contribute no
/// rows but are carried into the diagnostics. No partitions yields the empty
/// dataset.
pub fn merge(platform: Platform, partitions: Vec<Partition>) -> PlatformDataset {
    if partitions.is_empty() {
        return PlatformDataset::empty(platform);
    }

    let mut diagnostics = LoadDiagnostics {
        partitions_located: partitions.len(),
        ..LoadDiagnostics::default()
    };
    let mut table = Table::new();
    for partition in partitions {
        if partition.reference.bucket_label.is_none() {
            diagnostics.unlabeled_partitions += 1;
        }
        match partition.failure {
            Some(failure) => diagnostics.failures.push(failure),
            None => {
                diagnostics.partitions_loaded += 1;
                diagnostics.rows_read += partition.table.len();
                table.extend(partition.table);
            }
        }
    }
    debug!(
        "[trendlines:merge] platform='{}' columns={} {}",
        platform,
        table.column_count(),
        diagnostics.summary()
    );
    PlatformDataset {
        platform,
        table,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{FailureStage, PartitionFailure};
    use crate::partition::PartitionRef;
    use crate::table::{Cell, Row};

    fn partition(object: &str, label: Option<&str>, rows: Vec<Row>) -> Partition {
        Partition {
            reference: PartitionRef {
                object: object.to_string(),
                extension: "jsonl".to_string(),
                bucket_label: label.map(str::to_string),
            },
            table: Table::from_rows(rows),
            failure: None,
        }
    }

    fn row(pairs: &[(&str, Cell)]) -> Row {
        pairs
            .iter()
            .map(|(name, cell)| (name.to_string(), cell.clone()))
            .collect()
    }

    #[test]
    fn empty_input_is_empty_dataset() {
        let dataset = merge(Platform::reddit(), Vec::new());
        assert!(dataset.is_empty());
        assert_eq!(dataset.table.column_count(), 0);
        assert_eq!(dataset.diagnostics, LoadDiagnostics::default());
    }

    #[test]
    fn unions_heterogeneous_columns_and_tracks_failures() {
        let mut failed = partition("c.jsonl", Some("2024-01-01_12-00"), Vec::new());
        failed.failure = Some(PartitionFailure {
            object: "c.jsonl".into(),
            stage: FailureStage::Decode,
            reason: "bad".into(),
        });
        let dataset = merge(
            Platform::twitter(),
            vec![
                partition(
                    "a.jsonl",
                    Some("2024-01-01_00-00"),
                    vec![row(&[("likes", Cell::Int(1))])],
                ),
                partition(
                    "b.jsonl",
                    None,
                    vec![
                        row(&[("polarity", Cell::Float(0.1))]),
                        row(&[("likes", Cell::Int(2)), ("polarity", Cell::Null)]),
                    ],
                ),
                failed,
            ],
        );
        let columns: Vec<&str> = dataset.table.columns().collect();
        assert_eq!(columns, vec!["likes", "polarity"]);
        assert_eq!(dataset.table.len(), 3);
        assert!(!dataset.table.rows()[0].contains_key("polarity"));
        assert_eq!(dataset.diagnostics.partitions_located, 3);
        assert_eq!(dataset.diagnostics.partitions_loaded, 2);
        assert_eq!(dataset.diagnostics.unlabeled_partitions, 1);
        assert_eq!(dataset.diagnostics.rows_read, 3);
        assert_eq!(dataset.diagnostics.failures.len(), 1);
    }
}
