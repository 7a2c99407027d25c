use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::codec::PartitionFormat;
use crate::config::PartitionLayout;
use crate::constants::naming::PARTITION_FILE_STEM;
use crate::data::{Platform, RawRecord};
use crate::errors::SeriesError;
use crate::naming::{bucket_segment, render_bucket_label};
use crate::partition::PartitionRef;
use crate::storage::ObjectStore;
use crate::types::ObjectName;

/// Writes record batches as immutable, bucket-named partitions.
pub struct PartitionWriter {
    store: Arc<dyn ObjectStore>,
    layout: PartitionLayout,
}

impl PartitionWriter {
    /// Writer storing partitions in `store` under `layout`.
    pub fn new(store: Arc<dyn ObjectStore>, layout: PartitionLayout) -> Self {
        Self { store, layout }
    }

    /// Object name for a (platform, bucket, format) triple.
    ///
    /// `<root>/<platform>/creation_time=YYYY-MM-DD_HH-MM/part-00000.<ext>`;
    /// the bucket is truncated to the minute.
    pub fn object_name(
        &self,
        platform: &Platform,
        bucket: DateTime<Utc>,
        format: PartitionFormat,
    ) -> ObjectName {
        format!(
            "{}{}/{}.{}",
            self.layout.platform_prefix(platform),
            bucket_segment(bucket),
            PARTITION_FILE_STEM,
            format.extension()
        )
    }

    /// Encode `records` and store them as the partition for `bucket`.
    ///
    /// Every record must belong to `platform`. A bucket that already has a
    /// partition is rejected with `PartitionExists`.
    pub fn write(
        &self,
        platform: &Platform,
        bucket: DateTime<Utc>,
        records: &[RawRecord],
        format: PartitionFormat,
    ) -> Result<PartitionRef, SeriesError> {
        if let Some(stray) = records.iter().find(|record| &record.source != platform) {
            return Err(SeriesError::InvalidArgument(format!(
                "record from '{}' cannot be written to platform '{}'",
                stray.source, platform
            )));
        }
        if !self.layout.accepts_extension(format.extension()) {
            return Err(SeriesError::Configuration(format!(
                "format '{}' is not a configured partition extension",
                format.extension()
            )));
        }

        let object = self.object_name(platform, bucket, format);
        let data = format.encoder().encode(&object, records)?;
        let bytes = data.len();
        self.store.write_object(&object, data)?;
        info!(
            "[trendlines:write] platform='{}' object='{}' records={} bytes={}",
            platform,
            object,
            records.len(),
            bytes
        );
        Ok(PartitionRef {
            object,
            extension: format.extension().to_string(),
            bucket_label: Some(render_bucket_label(bucket)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;
    use chrono::TimeZone;

    fn writer() -> (Arc<InMemoryObjectStore>, PartitionWriter) {
        let store = Arc::new(InMemoryObjectStore::new());
        let writer = PartitionWriter::new(store.clone(), PartitionLayout::default());
        (store, writer)
    }

    #[test]
    fn names_follow_bucket_convention() {
        let (_, writer) = writer();
        let bucket = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 59).unwrap();
        assert_eq!(
            writer.object_name(&Platform::twitter(), bucket, PartitionFormat::Parquet),
            "processed/twitter/creation_time=2024-01-01_06-00/part-00000.parquet"
        );
    }

    #[test]
    fn one_partition_per_platform_bucket() {
        let (store, writer) = writer();
        let bucket = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![RawRecord::new(Platform::reddit(), "post", bucket)];
        let written = writer
            .write(&Platform::reddit(), bucket, &records, PartitionFormat::JsonLines)
            .unwrap();
        assert_eq!(written.bucket_label.as_deref(), Some("2024-01-01_00-00"));
        assert_eq!(store.len(), 1);

        let again = writer.write(&Platform::reddit(), bucket, &records, PartitionFormat::JsonLines);
        assert!(matches!(again, Err(SeriesError::PartitionExists(_))));
    }

    #[test]
    fn rejects_records_from_other_platforms() {
        let (store, writer) = writer();
        let bucket = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![RawRecord::new(Platform::twitter(), "tweet", bucket)];
        let result = writer.write(&Platform::reddit(), bucket, &records, PartitionFormat::Parquet);
        assert!(matches!(result, Err(SeriesError::InvalidArgument(_))));
        assert!(store.is_empty());
    }
}
