#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Per-timestamp aggregation of normalized datasets.
pub mod aggregate;
/// Cross-series bounds, step, and window filtering.
pub mod align;
/// Reusable CLI runners shared by the demo binaries.
pub mod apps;
/// Partition decoders and encoders (parquet, JSON lines).
pub mod codec;
/// Engine, layout, and storage configuration.
pub mod config;
/// Centralized constants for naming, columns, and defaults.
pub mod constants;
/// Platform identifiers, metrics, and raw records.
pub mod data;
/// Platform-level merge and normalization.
pub mod dataset;
/// Load diagnostics for recovered failures.
pub mod diagnostics;
/// Request-scoped comparison pipeline.
pub mod engine;
/// Series summary statistics.
pub mod metrics;
/// Partition naming convention helpers.
pub mod naming;
/// Partition discovery, loading, and writing.
pub mod partition;
/// Chart frames and presenters.
pub mod present;
/// Object storage abstraction and in-memory store.
pub mod storage;
/// Schema-flexible tables.
pub mod table;
/// Storage transports (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use aggregate::{AggregatedSeries, SeriesPoint, aggregate};
pub use align::{AlignedView, Aligner, RangeRequest, SelectableBounds, TimeWindow, ViewStatus};
pub use codec::{CodecRegistry, ColumnarDecoder, PartitionFormat, RecordEncoder};
pub use config::{EngineConfig, PartitionLayout, StorageSettings};
pub use data::{Metric, Platform, RawRecord};
pub use dataset::PlatformDataset;
pub use diagnostics::{FailureStage, LoadDiagnostics, PartitionFailure};
pub use engine::{Comparison, PlatformSeries, TrendEngine};
pub use errors::SeriesError;
pub use metrics::{SeriesSummary, series_summary};
pub use partition::{Partition, PartitionLoader, PartitionLocator, PartitionRef, PartitionWriter};
pub use present::{ChartFrame, ChartLine, FrameState, Presenter, TextPresenter, Visibility};
pub use storage::{InMemoryObjectStore, ObjectStore};
pub use table::{Cell, Row, Table};
pub use transport::FsObjectStore;
pub use types::{BucketLabel, ColumnName, Extension, ObjectName, ObjectPrefix};
