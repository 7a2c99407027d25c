use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::aggregate::{AggregatedSeries, aggregate};
use crate::align::{AlignedView, Aligner, RangeRequest};
use crate::codec::CodecRegistry;
use crate::config::EngineConfig;
use crate::data::Platform;
use crate::dataset::{PlatformDataset, merge, normalize};
use crate::diagnostics::LoadDiagnostics;
use crate::errors::SeriesError;
use crate::partition::{PartitionLoader, PartitionLocator};
use crate::storage::ObjectStore;

/// Aggregated series for one platform plus how it was loaded.
#[derive(Clone, Debug, Serialize)]
pub struct PlatformSeries {
    /// Per-timestamp means.
    pub series: AggregatedSeries,
    /// Load accounting for the platform.
    pub diagnostics: LoadDiagnostics,
}

/// Result of comparing two platforms.
#[derive(Clone, Debug, Serialize)]
pub struct Comparison {
    /// Both series on the common window.
    pub view: AlignedView,
    /// Load accounting for the left platform.
    pub left: LoadDiagnostics,
    /// Load accounting for the right platform.
    pub right: LoadDiagnostics,
}

impl Comparison {
    /// True if either platform load recovered from failures or dropped rows.
    pub fn has_warnings(&self) -> bool {
        self.left.has_warnings() || self.right.has_warnings()
    }
}

/// Request-scoped pipeline: locate, load, merge, normalize, aggregate, align.
///
/// Holds only injected collaborators and configuration; every call
/// recomputes from the stored partitions.
pub struct TrendEngine {
    locator: PartitionLocator,
    loader: PartitionLoader,
    aligner: Aligner,
    config: EngineConfig,
}

impl TrendEngine {
    /// Build an engine with the default codec registry.
    pub fn new(store: Arc<dyn ObjectStore>, config: EngineConfig) -> Result<Self, SeriesError> {
        Self::with_codecs(store, CodecRegistry::default(), config)
    }

    /// Build an engine with a custom codec registry.
    pub fn with_codecs(
        store: Arc<dyn ObjectStore>,
        codecs: CodecRegistry,
        config: EngineConfig,
    ) -> Result<Self, SeriesError> {
        config.validate()?;
        Ok(Self {
            locator: PartitionLocator::new(store.clone(), config.layout.clone()),
            loader: PartitionLoader::new(store, codecs),
            aligner: Aligner::new(config.default_step)?,
            config,
        })
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load, merge, and normalize every partition of `platform`.
    ///
    /// A platform with no partitions yields an empty dataset. Partition and
    /// row failures are recorded in the dataset diagnostics.
    pub fn load_platform(&self, platform: &Platform) -> Result<PlatformDataset, SeriesError> {
        let started = Instant::now();
        let references = self.locator.locate(platform)?;
        if references.is_empty() {
            info!(
                "[trendlines:engine] platform='{}' has no partitions under '{}'",
                platform,
                self.config.layout.platform_prefix(platform)
            );
            return Ok(PlatformDataset::empty(platform.clone()));
        }

        let partitions = self
            .loader
            .load_all(&references, self.config.parallel_loads);
        let dataset = normalize(merge(platform.clone(), partitions));
        info!(
            "[trendlines:engine] platform='{}' loaded in {:.2}s ({})",
            platform,
            started.elapsed().as_secs_f64(),
            dataset.diagnostics.summary()
        );
        Ok(dataset)
    }

    /// Aggregated per-timestamp means for `platform`.
    pub fn series(&self, platform: &Platform) -> Result<PlatformSeries, SeriesError> {
        let dataset = self.load_platform(platform)?;
        Ok(PlatformSeries {
            series: aggregate(&dataset),
            diagnostics: dataset.diagnostics,
        })
    }

    /// Align two platforms' series on a common window.
    ///
    /// Comparing a platform with itself is rejected as argument misuse.
    pub fn compare(
        &self,
        left: &Platform,
        right: &Platform,
        range: RangeRequest,
    ) -> Result<Comparison, SeriesError> {
        if left == right {
            return Err(SeriesError::InvalidArgument(format!(
                "cannot compare platform '{left}' with itself"
            )));
        }
        let left_series = self.series(left)?;
        let right_series = self.series(right)?;
        let view = self
            .aligner
            .align(&left_series.series, &right_series.series, range)?;
        info!(
            "[trendlines:engine] compare left='{}' ({} points) right='{}' ({} points) status={:?}",
            left,
            view.left.len(),
            right,
            view.right.len(),
            view.status
        );
        Ok(Comparison {
            view,
            left: left_series.diagnostics,
            right: right_series.diagnostics,
        })
    }
}
