//! In-memory tabular representation shared by codecs, the merger, and the
//! aggregator.
//!
//! Rows are sparse: a column missing from a row is absent, which is distinct
//! from an explicit `Cell::Null` and from zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde_json::Value;

use crate::types::ColumnName;

/// A single decoded value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Explicit null from the source file.
    Null,
    /// Boolean; never aggregated.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value; non-finite values are not numeric.
    Float(f64),
    /// Text, including unparsed bucket labels.
    Text(String),
    /// Native timestamp (parquet timestamp columns, parsed bucket labels).
    Timestamp(DateTime<Utc>),
}

impl Cell {
    /// Numeric view used by aggregation. Booleans are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(value) => Some(*value as f64),
            Cell::Float(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    /// True for `Int` and finite `Float` cells.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// True for an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Convert a decoded JSON value. Nested arrays/objects are kept as text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(flag) => Cell::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => Cell::Int(int),
                None => number.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(text) => Cell::Text(text.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Sparse row keyed by column name.
pub type Row = BTreeMap<ColumnName, Cell>;

/// Ordered set of columns plus the rows that populate them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: IndexSet<ColumnName>,
    rows: Vec<Row>,
}

impl Table {
    /// Table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, deriving the column set in first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row, registering any columns it introduces.
    pub fn push_row(&mut self, row: Row) {
        for column in row.keys() {
            if !self.columns.contains(column) {
                self.columns.insert(column.clone());
            }
        }
        self.rows.push(row);
    }

    /// Register a column without adding values (e.g. from a file schema).
    pub fn declare_column(&mut self, column: impl Into<ColumnName>) {
        self.columns.insert(column.into());
    }

    /// Append all rows of `other`, unioning its columns after ours.
    pub fn extend(&mut self, other: Table) {
        for column in other.columns {
            self.columns.insert(column);
        }
        self.rows.extend(other.rows);
    }

    /// Columns in first-seen order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Columns holding at least one `Int` or finite `Float`, in column order.
    ///
    /// Other kinds of value may appear in the same column; they are skipped
    /// value by value rather than disqualifying the column.
    pub fn numeric_columns(&self) -> Vec<ColumnName> {
        self.columns
            .iter()
            .filter(|column| {
                self.rows
                    .iter()
                    .any(|row| row.get(column.as_str()).is_some_and(Cell::is_numeric))
            })
            .cloned()
            .collect()
    }

    /// True if `column` is part of the column set.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable access for in-place row filtering.
    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    /// Row count.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of known columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
