use tracing::{debug, warn};

use crate::constants::columns::CREATION_TIME;
use crate::dataset::PlatformDataset;
use crate::naming::parse_bucket_label;
use crate::table::{Cell, Row, Table};
use crate::types::ColumnName;

/// Parse `creation_time` into UTC timestamps, dropping rows that cannot be
/// placed in time.
///
/// Text values must match `YYYY-MM-DD_HH-MM` exactly; native timestamp cells
/// pass through. Rows with a missing, null, or unparsable value are removed
/// and counted in `diagnostics.unparsed_timestamps`, since a null key would
/// break timestamp uniqueness downstream.
pub fn normalize(mut dataset: PlatformDataset) -> PlatformDataset {
    let rows = std::mem::take(dataset.table.rows_mut());
    let mut kept = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;
    for mut row in rows {
        match normalized_time(&row) {
            Some(cell) => {
                row.insert(CREATION_TIME.to_string(), cell);
                kept.push(row);
            }
            None => dropped += 1,
        }
    }
    *dataset.table.rows_mut() = kept;
    dataset.diagnostics.unparsed_timestamps += dropped;

    let non_numeric = count_non_numeric(&dataset.table);
    dataset.diagnostics.non_numeric_values += non_numeric;
    if non_numeric > 0 {
        warn!(
            "[trendlines:normalize] platform='{}' skipping {} non-numeric value(s) in numeric columns",
            dataset.platform, non_numeric
        );
    }

    if dropped > 0 {
        warn!(
            "[trendlines:normalize] platform='{}' dropped {} row(s) without a parsable {}",
            dataset.platform, dropped, CREATION_TIME
        );
    } else {
        debug!(
            "[trendlines:normalize] platform='{}' rows={}",
            dataset.platform,
            dataset.table.len()
        );
    }
    dataset
}

/// Non-null cells that aggregation will skip inside otherwise numeric columns.
fn count_non_numeric(table: &Table) -> usize {
    let columns: Vec<ColumnName> = table
        .numeric_columns()
        .into_iter()
        .filter(|column| column != CREATION_TIME)
        .collect();
    table
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .filter_map(|column| row.get(column))
                .filter(|cell| !cell.is_null() && !cell.is_numeric())
                .count()
        })
        .sum()
}

fn normalized_time(row: &Row) -> Option<Cell> {
    match row.get(CREATION_TIME)? {
        Cell::Timestamp(at) => Some(Cell::Timestamp(*at)),
        Cell::Text(label) => parse_bucket_label(label).map(Cell::Timestamp),
        _ => None,
    }
}
