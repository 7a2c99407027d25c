/// Naming-convention constants shared by the locator, writer, and normalizer.
pub mod naming {
    /// Key that introduces the bucket label inside an object name.
    pub const CREATION_TIME_KEY: &str = "creation_time";
    /// Regex that extracts the bucket label from anywhere in an object name.
    pub const CREATION_TIME_PATTERN: &str = r"creation_time=(\d{4}-\d{2}-\d{2}_\d{2}-\d{2})";
    /// Anchored regex a bucket label must match before it is parsed.
    pub const BUCKET_LABEL_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}$";
    /// chrono format of a bucket label (`YYYY-MM-DD_HH-MM`).
    pub const BUCKET_LABEL_FORMAT: &str = "%Y-%m-%d_%H-%M";
    /// File stem used for partitions produced by the writer.
    pub const PARTITION_FILE_STEM: &str = "part-00000";
    /// Default root prefix for processed partitions.
    pub const DEFAULT_ROOT_PREFIX: &str = "processed";
}

/// Column names the engine reads by name.
pub mod columns {
    /// Bucket timestamp column attached by the loader.
    pub const CREATION_TIME: &str = "creation_time";
    /// Sentiment score metric column.
    pub const SENTIMENT_SCORE: &str = "sentiment_score";
    /// Polarity metric column.
    pub const POLARITY: &str = "polarity";
    /// Subjectivity metric column.
    pub const SUBJECTIVITY: &str = "subjectivity";
}

/// Partition codec extensions.
pub mod formats {
    /// Columnar partitions.
    pub const PARQUET: &str = "parquet";
    /// Newline-delimited JSON partitions.
    pub const JSONL: &str = "jsonl";
    /// Alias for newline-delimited JSON.
    pub const NDJSON: &str = "ndjson";
    /// Plain JSON extension; decoded as JSON lines or a single array.
    pub const JSON: &str = "json";
}

/// Alignment policy defaults.
pub mod align {
    /// Step used by range controls when fewer than two timestamps exist.
    pub const DEFAULT_STEP_SECS: i64 = 6 * 60 * 60;
}

/// Platform identifier constraints.
pub mod platform {
    /// Maximum byte length of a platform identifier.
    pub const MAX_PLATFORM_LEN: usize = 64;
    /// Well-known platform: Twitter.
    pub const TWITTER: &str = "twitter";
    /// Well-known platform: Reddit.
    pub const REDDIT: &str = "reddit";
}

/// Environment variables consulted at startup.
pub mod env {
    /// Root directory of the filesystem object store.
    pub const STORAGE_ROOT: &str = "TRENDLINES_STORAGE_ROOT";
}
