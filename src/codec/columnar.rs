use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat};
use parquet::basic::Compression;
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, Int64Type};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::{SerializedColumnWriter, SerializedFileWriter};
use parquet::record::Field;
use parquet::schema::parser::parse_message_type;

use crate::codec::{ColumnarDecoder, RecordEncoder};
use crate::data::RawRecord;
use crate::errors::SeriesError;
use crate::table::{Cell, Row, Table};

/// Fixed schema written for `RawRecord` partitions. Leaf order matters:
/// `encode` fills columns in exactly this order.
const RAW_RECORD_SCHEMA: &str = "
message raw_record {
    REQUIRED BYTE_ARRAY source (UTF8);
    OPTIONAL BYTE_ARRAY subreddit (UTF8);
    REQUIRED BYTE_ARRAY text (UTF8);
    OPTIONAL DOUBLE sentiment_score;
    OPTIONAL DOUBLE polarity;
    OPTIONAL DOUBLE subjectivity;
    OPTIONAL INT64 likes;
    OPTIONAL INT64 upvotes;
    REQUIRED BYTE_ARRAY timestamp (UTF8);
}
";

/// Parquet partition codec backed by the parquet record API.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParquetCodec;

impl ColumnarDecoder for ParquetCodec {
    fn decode(&self, object: &str, data: &Bytes) -> Result<Table, SeriesError> {
        let decode_err = |err: ParquetError| SeriesError::Decode {
            object: object.to_string(),
            reason: err.to_string(),
        };
        let reader = SerializedFileReader::new(data.clone()).map_err(decode_err)?;

        let mut table = Table::new();
        for field in reader.metadata().file_metadata().schema().get_fields() {
            table.declare_column(field.name());
        }

        let rows = reader.get_row_iter(None).map_err(decode_err)?;
        for (position, row_result) in rows.enumerate() {
            let row = row_result.map_err(|err| SeriesError::Decode {
                object: object.to_string(),
                reason: format!("failed reading row {position}: {err}"),
            })?;
            let mut decoded = Row::new();
            for (name, field) in row.get_column_iter() {
                decoded.insert(name.clone(), cell_from_field(field));
            }
            table.push_row(decoded);
        }
        Ok(table)
    }
}

impl RecordEncoder for ParquetCodec {
    fn encode(&self, object: &str, records: &[RawRecord]) -> Result<Bytes, SeriesError> {
        let encode_err = |err: ParquetError| SeriesError::Encode {
            object: object.to_string(),
            reason: err.to_string(),
        };
        let schema = Arc::new(parse_message_type(RAW_RECORD_SCHEMA).map_err(encode_err)?);
        let props = Arc::new(
            WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build(),
        );

        let mut buffer = Vec::new();
        let mut writer =
            SerializedFileWriter::new(&mut buffer, schema, props).map_err(encode_err)?;
        if !records.is_empty() {
            let mut row_group = writer.next_row_group().map_err(encode_err)?;
            let mut column_idx = 0usize;
            while let Some(mut column) = row_group.next_column().map_err(encode_err)? {
                write_record_column(&mut column, column_idx, records).map_err(encode_err)?;
                column.close().map_err(encode_err)?;
                column_idx += 1;
            }
            row_group.close().map_err(encode_err)?;
        }
        writer.close().map_err(encode_err)?;
        Ok(Bytes::from(buffer))
    }
}

fn write_record_column(
    column: &mut SerializedColumnWriter<'_>,
    column_idx: usize,
    records: &[RawRecord],
) -> Result<(), ParquetError> {
    match column_idx {
        0 => write_required_strings(column, records.iter().map(|r| r.source.as_str())),
        1 => write_optional_strings(column, records.iter().map(|r| r.subreddit.as_deref())),
        2 => write_required_strings(column, records.iter().map(|r| r.text.as_str())),
        3 => write_optional::<DoubleType>(column, records.iter().map(|r| r.sentiment_score)),
        4 => write_optional::<DoubleType>(column, records.iter().map(|r| r.polarity)),
        5 => write_optional::<DoubleType>(column, records.iter().map(|r| r.subjectivity)),
        6 => write_optional::<Int64Type>(column, records.iter().map(|r| r.likes)),
        7 => write_optional::<Int64Type>(column, records.iter().map(|r| r.upvotes)),
        8 => {
            let stamps: Vec<String> = records
                .iter()
                .map(|r| r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
                .collect();
            write_required_strings(column, stamps.iter().map(String::as_str))
        }
        other => Err(ParquetError::General(format!(
            "unexpected column index {other} in record schema"
        ))),
    }
}

fn write_required_strings<'a>(
    column: &mut SerializedColumnWriter<'_>,
    values: impl Iterator<Item = &'a str>,
) -> Result<(), ParquetError> {
    let values: Vec<ByteArray> = values.map(ByteArray::from).collect();
    column
        .typed::<ByteArrayType>()
        .write_batch(&values, None, None)?;
    Ok(())
}

fn write_optional_strings<'a>(
    column: &mut SerializedColumnWriter<'_>,
    values: impl Iterator<Item = Option<&'a str>>,
) -> Result<(), ParquetError> {
    let mut present = Vec::new();
    let mut def_levels = Vec::new();
    for value in values {
        match value {
            Some(text) => {
                present.push(ByteArray::from(text));
                def_levels.push(1);
            }
            None => def_levels.push(0),
        }
    }
    column
        .typed::<ByteArrayType>()
        .write_batch(&present, Some(&def_levels), None)?;
    Ok(())
}

fn write_optional<T>(
    column: &mut SerializedColumnWriter<'_>,
    values: impl Iterator<Item = Option<T::T>>,
) -> Result<(), ParquetError>
where
    T: parquet::data_type::DataType,
{
    let mut present = Vec::new();
    let mut def_levels = Vec::new();
    for value in values {
        match value {
            Some(value) => {
                present.push(value);
                def_levels.push(1);
            }
            None => def_levels.push(0),
        }
    }
    column
        .typed::<T>()
        .write_batch(&present, Some(&def_levels), None)?;
    Ok(())
}

/// Map a parquet record field onto a table cell.
///
/// Unsigned 64-bit values that do not fit `i64` degrade to floats; nested and
/// exotic logical types are kept as their display text.
fn cell_from_field(field: &Field) -> Cell {
    match field {
        Field::Null => Cell::Null,
        Field::Bool(value) => Cell::Bool(*value),
        Field::Byte(value) => Cell::Int(i64::from(*value)),
        Field::Short(value) => Cell::Int(i64::from(*value)),
        Field::Int(value) => Cell::Int(i64::from(*value)),
        Field::Long(value) => Cell::Int(*value),
        Field::UByte(value) => Cell::Int(i64::from(*value)),
        Field::UShort(value) => Cell::Int(i64::from(*value)),
        Field::UInt(value) => Cell::Int(i64::from(*value)),
        Field::ULong(value) => i64::try_from(*value)
            .map(Cell::Int)
            .unwrap_or(Cell::Float(*value as f64)),
        Field::Float(value) => Cell::Float(f64::from(*value)),
        Field::Double(value) => Cell::Float(*value),
        Field::Str(value) => Cell::Text(value.clone()),
        Field::TimestampMillis(value) => DateTime::from_timestamp_millis(*value)
            .map(Cell::Timestamp)
            .unwrap_or(Cell::Null),
        Field::TimestampMicros(value) => DateTime::from_timestamp_micros(*value)
            .map(Cell::Timestamp)
            .unwrap_or(Cell::Null),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Platform;
    use chrono::{TimeZone, Utc};

    fn records() -> Vec<RawRecord> {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 3, 0).unwrap();
        let mut first = RawRecord::new(Platform::reddit(), "first", at).with_sentiment(3.0);
        first.subreddit = Some("technology".to_string());
        first.upvotes = Some(12);
        let second = RawRecord::new(Platform::reddit(), "second", at)
            .with_polarity_subjectivity(-0.25, 0.5);
        vec![first, second]
    }

    #[test]
    fn encoded_records_decode_with_nulls_for_missing_values() {
        let bytes = ParquetCodec.encode("obj", &records()).unwrap();
        let table = ParquetCodec.decode("obj", &bytes).unwrap();

        assert_eq!(table.len(), 2);
        let columns: Vec<&str> = table.columns().collect();
        assert_eq!(
            columns,
            vec![
                "source",
                "subreddit",
                "text",
                "sentiment_score",
                "polarity",
                "subjectivity",
                "likes",
                "upvotes",
                "timestamp"
            ]
        );
        let first = &table.rows()[0];
        assert_eq!(first["source"], Cell::Text("reddit".into()));
        assert_eq!(first["sentiment_score"], Cell::Float(3.0));
        assert_eq!(first["upvotes"], Cell::Int(12));
        assert!(first["polarity"].is_null());
        assert_eq!(first["timestamp"], Cell::Text("2024-01-01T00:03:00Z".into()));

        let second = &table.rows()[1];
        assert!(second["sentiment_score"].is_null());
        assert_eq!(second["polarity"], Cell::Float(-0.25));
        assert!(second["subreddit"].is_null());
    }

    #[test]
    fn empty_record_set_yields_schema_only_table() {
        let bytes = ParquetCodec.encode("obj", &[]).unwrap();
        let table = ParquetCodec.decode("obj", &bytes).unwrap();
        assert!(table.is_empty());
        assert!(table.has_column("sentiment_score"));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = ParquetCodec
            .decode("broken.parquet", &Bytes::from_static(b"not parquet at all"))
            .unwrap_err();
        assert!(matches!(err, SeriesError::Decode { object, .. } if object == "broken.parquet"));
    }
}
