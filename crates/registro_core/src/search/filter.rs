//! Case-insensitive substring filter over whole rows.
//!
//! # Invariants
//! - A blank query returns the input table unchanged.
//! - Matching rows keep their order and their table index.
//! - The query is matched against all cell values joined with a single
//!   space, so a match may straddle two adjacent cells (`"12"` followed by
//!   `"34"` matches `"2 3"`).

use crate::model::table::{Row, Table};
use log::debug;

/// Returns the rows of `table` whose joined text contains `query`.
pub fn filter_table(table: &Table, query: &str) -> Table {
    if query.is_empty() {
        return table.clone();
    }

    let needle = query.to_lowercase();
    let rows: Vec<Row> = table
        .rows()
        .iter()
        .filter(|row| row_haystack(table, row).contains(&needle))
        .cloned()
        .collect();

    debug!(
        "event=table_filter module=search status=ok rows_in={} rows_out={} query_chars={}",
        table.len(),
        rows.len(),
        query.chars().count()
    );
    Table::from_rows(table.columns().to_vec(), rows)
}

fn row_haystack(table: &Table, row: &Row) -> String {
    table
        .values(&row.record)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
