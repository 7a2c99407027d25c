use std::env;
use std::path::PathBuf;

use chrono::TimeDelta;

use crate::constants::align::DEFAULT_STEP_SECS;
use crate::constants::env::STORAGE_ROOT;
use crate::constants::formats;
use crate::constants::naming::DEFAULT_ROOT_PREFIX;
use crate::data::Platform;
use crate::errors::SeriesError;
use crate::types::{Extension, ObjectPrefix};

/// Where partitions live in storage and which files count as partitions.
#[derive(Clone, Debug)]
pub struct PartitionLayout {
    /// Prefix shared by every platform dataset (`processed` by default).
    ///
    /// An empty prefix places platform folders at the store root.
    pub root_prefix: String,
    /// Extensions (case-insensitive) accepted as partition files.
    pub extensions: Vec<Extension>,
}

impl PartitionLayout {
    /// Platform-scoped listing prefix, always ending in `/`.
    pub fn platform_prefix(&self, platform: &Platform) -> ObjectPrefix {
        let root = self.root_prefix.trim_matches('/');
        if root.is_empty() {
            format!("{platform}/")
        } else {
            format!("{root}/{platform}/")
        }
    }

    /// True if `extension` is configured as a partition extension.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    }
}

impl Default for PartitionLayout {
    fn default() -> Self {
        Self {
            root_prefix: DEFAULT_ROOT_PREFIX.to_string(),
            extensions: [formats::PARQUET, formats::JSONL, formats::NDJSON, formats::JSON]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Storage layout for partition discovery and writing.
    pub layout: PartitionLayout,
    /// Range-control step used when fewer than two distinct timestamps exist.
    pub default_step: TimeDelta,
    /// Load a platform's partitions on the rayon pool. Results are joined and
    /// ordered identically either way.
    pub parallel_loads: bool,
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), SeriesError> {
        if self.default_step <= TimeDelta::zero() {
            return Err(SeriesError::Configuration(
                "default_step must be positive".to_string(),
            ));
        }
        if self.layout.extensions.is_empty() {
            return Err(SeriesError::Configuration(
                "at least one partition extension is required".to_string(),
            ));
        }
        if self
            .layout
            .extensions
            .iter()
            .any(|ext| ext.is_empty() || ext.contains('.') || ext.contains('/'))
        {
            return Err(SeriesError::Configuration(format!(
                "partition extensions must be bare names, got {:?}",
                self.layout.extensions
            )));
        }
        if self.layout.root_prefix.split('/').any(|segment| segment == "..") {
            return Err(SeriesError::Configuration(format!(
                "root_prefix '{}' must not contain '..'",
                self.layout.root_prefix
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: PartitionLayout::default(),
            default_step: TimeDelta::seconds(DEFAULT_STEP_SECS),
            parallel_loads: true,
        }
    }
}

/// Connection settings for the filesystem object store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageSettings {
    /// Directory holding the object store.
    pub root: PathBuf,
}

impl StorageSettings {
    /// Resolve the storage root from an explicit value, falling back to
    /// `TRENDLINES_STORAGE_ROOT`. Missing configuration is fatal.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, SeriesError> {
        Self::resolve_with(explicit, env::var_os(STORAGE_ROOT).map(PathBuf::from))
    }

    /// Resolve from the environment only.
    pub fn from_env() -> Result<Self, SeriesError> {
        Self::resolve(None)
    }

    fn resolve_with(
        explicit: Option<PathBuf>,
        from_env: Option<PathBuf>,
    ) -> Result<Self, SeriesError> {
        let root = explicit
            .or(from_env)
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| {
                SeriesError::Configuration(format!(
                    "storage root not configured; pass --storage-root or set {STORAGE_ROOT}"
                ))
            })?;
        Ok(Self { root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_prefix_handles_empty_and_slashed_roots() {
        let platform = Platform::new("alpha").unwrap();
        let mut layout = PartitionLayout::default();
        assert_eq!(layout.platform_prefix(&platform), "processed/alpha/");
        layout.root_prefix = "/data/processed/".to_string();
        assert_eq!(layout.platform_prefix(&platform), "data/processed/alpha/");
        layout.root_prefix = String::new();
        assert_eq!(layout.platform_prefix(&platform), "alpha/");
    }

    #[test]
    fn default_layout_accepts_every_default_decoder() {
        let layout = PartitionLayout::default();
        let codecs = crate::codec::CodecRegistry::default();
        for extension in &layout.extensions {
            assert!(codecs.supports(extension), "no decoder for {extension}");
        }
        for extension in ["parquet", "jsonl", "ndjson", "JSON"] {
            assert!(layout.accepts_extension(extension));
        }
    }

    #[test]
    fn validate_rejects_bad_policy() {
        assert!(EngineConfig::default().validate().is_ok());

        let mut config = EngineConfig::default();
        config.default_step = TimeDelta::zero();
        assert!(matches!(config.validate(), Err(SeriesError::Configuration(_))));

        let mut config = EngineConfig::default();
        config.layout.extensions.clear();
        assert!(matches!(config.validate(), Err(SeriesError::Configuration(_))));

        let mut config = EngineConfig::default();
        config.layout.extensions = vec![".parquet".to_string()];
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.layout.root_prefix = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn storage_root_prefers_explicit_then_env() {
        let explicit = StorageSettings::resolve_with(
            Some(PathBuf::from("/a")),
            Some(PathBuf::from("/b")),
        )
        .unwrap();
        assert_eq!(explicit.root, PathBuf::from("/a"));

        let env_only = StorageSettings::resolve_with(None, Some(PathBuf::from("/b"))).unwrap();
        assert_eq!(env_only.root, PathBuf::from("/b"));

        assert!(matches!(
            StorageSettings::resolve_with(None, None),
            Err(SeriesError::Configuration(_))
        ));
        assert!(StorageSettings::resolve_with(None, Some(PathBuf::new())).is_err());
    }
}
