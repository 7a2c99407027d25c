use std::sync::Arc;

use tracing::debug;

use crate::codec::object_extension;
use crate::config::PartitionLayout;
use crate::data::Platform;
use crate::errors::SeriesError;
use crate::naming::extract_bucket_label;
use crate::partition::PartitionRef;
use crate::storage::ObjectStore;

/// Lists the partition objects that make up a platform dataset.
pub struct PartitionLocator {
    store: Arc<dyn ObjectStore>,
    layout: PartitionLayout,
}

impl PartitionLocator {
    /// Locator listing `store` under `layout`.
    pub fn new(store: Arc<dyn ObjectStore>, layout: PartitionLayout) -> Self {
        Self { store, layout }
    }

    /// Locate every partition for `platform`, sorted by object name.
    ///
    /// An empty result means the platform has no data yet; it is not an
    /// error. Only a failing store listing is reported as `Err`.
    pub fn locate(&self, platform: &Platform) -> Result<Vec<PartitionRef>, SeriesError> {
        let prefix = self.layout.platform_prefix(platform);
        let mut names = self.store.list_objects(&prefix)?;
        names.sort();
        names.dedup();

        let listed = names.len();
        let partitions: Vec<PartitionRef> = names
            .into_iter()
            .filter(|name| name.starts_with(&prefix))
            .filter_map(|object| {
                let extension = object_extension(&object)?;
                if !self.layout.accepts_extension(&extension) {
                    return None;
                }
                Some(PartitionRef {
                    bucket_label: extract_bucket_label(&object),
                    extension,
                    object,
                })
            })
            .collect();
        debug!(
            "[trendlines:locate] platform='{}' prefix='{}' listed={} partitions={}",
            platform,
            prefix,
            listed,
            partitions.len()
        );
        Ok(partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;
    use bytes::Bytes;

    fn store(names: &[&str]) -> Arc<dyn ObjectStore> {
        Arc::new(InMemoryObjectStore::with_objects(
            names
                .iter()
                .map(|name| (name.to_string(), Bytes::from_static(b""))),
        ))
    }

    #[test]
    fn filters_extensions_and_keeps_unlabeled_names() {
        let locator = PartitionLocator::new(
            store(&[
                "processed/alpha/creation_time=2024-01-01_06-00/part-00000.parquet",
                "processed/alpha/creation_time=2024-01-01_00-00/part-00000.PARQUET",
                "processed/alpha/_SUCCESS",
                "processed/alpha/notes.txt",
                "processed/alpha/alpha_sentiment.parquet",
                "processed/beta/creation_time=2024-01-01_00-00/part-00000.parquet",
            ]),
            PartitionLayout::default(),
        );
        let refs = locator.locate(&Platform::new("alpha").unwrap()).unwrap();
        let summary: Vec<(&str, Option<&str>)> = refs
            .iter()
            .map(|r| (r.object.as_str(), r.bucket_label.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("processed/alpha/alpha_sentiment.parquet", None),
                (
                    "processed/alpha/creation_time=2024-01-01_00-00/part-00000.PARQUET",
                    Some("2024-01-01_00-00")
                ),
                (
                    "processed/alpha/creation_time=2024-01-01_06-00/part-00000.parquet",
                    Some("2024-01-01_06-00")
                ),
            ]
        );
        assert!(refs.iter().all(|r| r.extension == "parquet"));
    }

    #[test]
    fn missing_platform_is_empty_not_error() {
        let locator = PartitionLocator::new(store(&[]), PartitionLayout::default());
        assert!(locator.locate(&Platform::new("beta").unwrap()).unwrap().is_empty());
    }
}
