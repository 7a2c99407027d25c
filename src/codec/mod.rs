//! Partition codecs.
//!
//! A codec turns stored bytes into a [`Table`] (decode) and, for the formats
//! the writer produces, `RawRecord`s into bytes (encode). Codecs are chosen by
//! object-name extension through a [`CodecRegistry`].

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use clap::ValueEnum;

use crate::constants::formats;
use crate::data::RawRecord;
use crate::errors::SeriesError;
use crate::table::Table;
use crate::types::Extension;

/// Columnar parquet codec.
pub mod columnar;
/// Newline-delimited JSON codec.
pub mod jsonl;

pub use columnar::ParquetCodec;
pub use jsonl::JsonLinesCodec;

/// Decodes one stored object into a table.
pub trait ColumnarDecoder: Send + Sync {
    /// Decode `data` read from `object`. `object` is used for error context only.
    fn decode(&self, object: &str, data: &Bytes) -> Result<Table, SeriesError>;
}

/// Encodes records into the bytes of one partition object.
pub trait RecordEncoder: Send + Sync {
    /// Encode `records` as the contents of `object`.
    fn encode(&self, object: &str, records: &[RawRecord]) -> Result<Bytes, SeriesError>;
}

/// Formats the partition writer can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum PartitionFormat {
    /// Snappy-compressed parquet with the fixed record schema.
    Parquet,
    /// One serde-serialized record per line.
    #[value(name = "jsonl")]
    JsonLines,
}

impl PartitionFormat {
    /// Extension used in object names for this format.
    pub fn extension(self) -> &'static str {
        match self {
            PartitionFormat::Parquet => formats::PARQUET,
            PartitionFormat::JsonLines => formats::JSONL,
        }
    }

    /// Encoder that writes this format.
    pub fn encoder(self) -> &'static dyn RecordEncoder {
        match self {
            PartitionFormat::Parquet => &ParquetCodec,
            PartitionFormat::JsonLines => &JsonLinesCodec,
        }
    }
}

/// Extension-keyed decoder lookup.
///
/// Extensions are matched case-insensitively.
#[derive(Clone)]
pub struct CodecRegistry {
    decoders: HashMap<Extension, Arc<dyn ColumnarDecoder>>,
}

impl CodecRegistry {
    /// Registry with no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register (or replace) the decoder for `extension`.
    pub fn register(
        &mut self,
        extension: impl Into<Extension>,
        decoder: Arc<dyn ColumnarDecoder>,
    ) -> &mut Self {
        self.decoders
            .insert(extension.into().to_ascii_lowercase(), decoder);
        self
    }

    /// Decoder for an object name, selected by its extension.
    pub fn for_object(&self, object: &str) -> Option<&Arc<dyn ColumnarDecoder>> {
        let extension = object_extension(object)?;
        self.decoders.get(&extension)
    }

    /// True if a decoder is registered for `extension`.
    pub fn supports(&self, extension: &str) -> bool {
        self.decoders.contains_key(&extension.to_ascii_lowercase())
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let jsonl: Arc<dyn ColumnarDecoder> = Arc::new(JsonLinesCodec);
        let mut registry = Self::empty();
        registry
            .register(formats::PARQUET, Arc::new(ParquetCodec))
            .register(formats::JSONL, jsonl.clone())
            .register(formats::NDJSON, jsonl.clone())
            .register(formats::JSON, jsonl);
        registry
    }
}

/// Lowercased extension of the final path segment, if any.
pub fn object_extension(object: &str) -> Option<Extension> {
    let file_name = object.rsplit('/').next().unwrap_or(object);
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}
