/// Slash-separated storage object name.
/// Example: `processed/twitter/creation_time=2024-01-01_06-00/part-00000.parquet`
pub type ObjectName = String;
/// Storage listing prefix.
/// Example: `processed/reddit/`
pub type ObjectPrefix = String;
/// Tabular column name.
/// Examples: `sentiment_score`, `creation_time`, `subreddit`
pub type ColumnName = String;
/// Bucket label embedded in a partition object name.
/// Example: `2024-01-01_06-00`
pub type BucketLabel = String;
/// File extension used to select a partition codec.
/// Examples: `parquet`, `jsonl`
pub type Extension = String;
