//! Schema-free registry table.
//!
//! # Responsibility
//! - Hold an ordered sequence of records over a dynamic column set.
//! - Track the positional index each row had in the full table, so filtered
//!   views can address rows of the table they came from.
//!
//! # Invariants
//! - A freshly loaded table is indexed `0..len` contiguously.
//! - `remove_row` reindexes the remaining rows contiguously from zero.
//! - A cell missing from a record reads as the empty string.

use serde::Serialize;
use std::collections::BTreeMap;

/// One registry row: column identifier → text value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Creates an empty record (every cell reads as `""`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell value, or `""` when the cell is missing.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Sets one cell, replacing any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Removes one cell.
    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.fields.remove(column)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

/// A record together with its index in the full table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub index: usize,
    pub record: Record,
}

/// Ordered rows sharing one column set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given column order.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from records, indexing them `0..len`.
    pub fn from_records<I>(columns: Vec<String>, records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Row { index, record })
            .collect();
        Self { columns, rows }
    }

    /// Builds a view that keeps the indices of the rows it was given.
    pub(crate) fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|candidate| candidate == column)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds a row by its table index (not its position in this view).
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.iter().find(|row| row.index == index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| row.index == index)
    }

    /// Cell values of one record in column order.
    pub fn values<'a>(&'a self, record: &'a Record) -> impl Iterator<Item = &'a str> + 'a {
        self.columns.iter().map(move |column| record.get(column))
    }

    /// Values of one column across all rows, in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows.iter().map(move |row| row.record.get(column))
    }

    /// Appends a record after the current last row and returns its index.
    pub fn push(&mut self, record: Record) -> usize {
        let index = self.rows.last().map_or(0, |row| row.index + 1);
        self.rows.push(Row { index, record });
        index
    }

    /// Removes the row with the given index and reindexes the rest from zero.
    pub fn remove_row(&mut self, index: usize) -> Option<Record> {
        let position = self.rows.iter().position(|row| row.index == index)?;
        let removed = self.rows.remove(position);
        self.reindex();
        Some(removed.record)
    }

    /// Renumbers rows `0..len`, preserving order.
    pub fn reindex(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.index = index;
        }
    }

    /// Drops every column the predicate rejects, from the header and all rows.
    ///
    /// Returns the dropped identifiers.
    pub fn retain_columns<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let (kept, dropped): (Vec<String>, Vec<String>) =
            self.columns.drain(..).partition(|column| keep(column));
        self.columns = kept;

        if !dropped.is_empty() {
            for row in &mut self.rows {
                for column in &dropped {
                    row.record.remove(column);
                }
            }
        }

        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, Table};

    fn sample() -> Table {
        let columns = vec!["estado".to_string(), "n°".to_string()];
        Table::from_records(
            columns,
            ["AUTORIZADO", "ESPERA", "AUTORIZADO"]
                .into_iter()
                .enumerate()
                .map(|(i, estado)| {
                    [("estado", estado.to_string()), ("n°", (i + 1).to_string())]
                        .into_iter()
                        .collect::<Record>()
                }),
        )
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let record = Record::new();
        assert_eq!(record.get("dni"), "");
    }

    #[test]
    fn remove_row_reindexes_and_keeps_order() {
        let mut table = sample();
        let removed = table.remove_row(1).expect("row 1 exists");
        assert_eq!(removed.get("estado"), "ESPERA");

        let indices: Vec<usize> = table.rows().iter().map(|row| row.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(table.rows()[1].record.get("n°"), "3");
    }

    #[test]
    fn push_continues_after_last_index() {
        let mut table = sample();
        assert_eq!(table.push(Record::new()), 3);
        assert_eq!(Table::new(vec![]).push(Record::new()), 0);
    }

    #[test]
    fn retain_columns_strips_header_and_cells() {
        let mut table = sample();
        let dropped = table.retain_columns(|column| column != "n°");
        assert_eq!(dropped, vec!["n°".to_string()]);
        assert_eq!(table.columns(), ["estado".to_string()]);
        assert_eq!(
            table.rows()[0].record,
            [("estado", "AUTORIZADO")].into_iter().collect::<Record>()
        );
    }
}
