use bytes::Bytes;
use serde_json::Value;

use crate::codec::{ColumnarDecoder, RecordEncoder};
use crate::data::RawRecord;
use crate::errors::SeriesError;
use crate::table::{Cell, Row, Table};

/// Newline-delimited JSON codec.
///
/// Decoding also accepts a single top-level JSON array of objects, which is
/// how raw ingestion dumps are stored.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLinesCodec;

impl JsonLinesCodec {
    fn row_from_value(object: &str, line: usize, value: Value) -> Result<Row, SeriesError> {
        let Value::Object(map) = value else {
            return Err(SeriesError::Decode {
                object: object.to_string(),
                reason: format!("line {line} is not a JSON object"),
            });
        };
        Ok(map
            .iter()
            .map(|(key, value)| (key.clone(), Cell::from_json(value)))
            .collect())
    }
}

impl ColumnarDecoder for JsonLinesCodec {
    fn decode(&self, object: &str, data: &Bytes) -> Result<Table, SeriesError> {
        let text = std::str::from_utf8(data).map_err(|err| SeriesError::Decode {
            object: object.to_string(),
            reason: format!("payload is not valid UTF-8: {err}"),
        })?;

        let mut table = Table::new();
        if text.trim_start().starts_with('[') {
            let values: Vec<Value> =
                serde_json::from_str(text).map_err(|err| SeriesError::Decode {
                    object: object.to_string(),
                    reason: format!("invalid JSON array: {err}"),
                })?;
            for (idx, value) in values.into_iter().enumerate() {
                table.push_row(Self::row_from_value(object, idx + 1, value)?);
            }
            return Ok(table);
        }

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|err| SeriesError::Decode {
                object: object.to_string(),
                reason: format!("invalid JSON on line {line_no}: {err}"),
            })?;
            table.push_row(Self::row_from_value(object, line_no, value)?);
        }
        Ok(table)
    }
}

impl RecordEncoder for JsonLinesCodec {
    fn encode(&self, object: &str, records: &[RawRecord]) -> Result<Bytes, SeriesError> {
        let mut out = Vec::new();
        for record in records {
            serde_json::to_writer(&mut out, record).map_err(|err| SeriesError::Encode {
                object: object.to_string(),
                reason: err.to_string(),
            })?;
            out.push(b'\n');
        }
        Ok(Bytes::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lines_and_skips_blanks() {
        let data = Bytes::from_static(
            b"{\"source\":\"twitter\",\"sentiment_score\":0.5}\n\n{\"source\":\"twitter\",\"likes\":4}\n",
        );
        let table = JsonLinesCodec.decode("p.jsonl", &data).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0]["sentiment_score"], Cell::Float(0.5));
        assert!(!table.rows()[0].contains_key("likes"));
        assert_eq!(table.rows()[1]["likes"], Cell::Int(4));
    }

    #[test]
    fn decodes_top_level_array() {
        let data = Bytes::from_static(b"[{\"source\":\"reddit\",\"text\":\"a\"},{\"source\":\"reddit\",\"text\":\"b\"}]");
        let table = JsonLinesCodec.decode("reddit_data.json", &data).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1]["text"], Cell::Text("b".into()));
    }

    #[test]
    fn malformed_line_fails_whole_object() {
        let data = Bytes::from_static(b"{\"a\":1}\n{oops\n");
        let err = JsonLinesCodec.decode("p.jsonl", &data).unwrap_err();
        assert!(matches!(err, SeriesError::Decode { reason, .. } if reason.contains("line 2")));

        let data = Bytes::from_static(b"[1, 2]");
        assert!(JsonLinesCodec.decode("p.json", &data).is_err());
    }
}
