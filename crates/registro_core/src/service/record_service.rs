//! Registry record workflow.
//!
//! # Responsibility
//! - Run each user action as one load → filter → mutate → save cycle.
//! - Bound edit/delete targets to rows visible under the current search.
//! - Produce exports of the current search without touching storage.
//!
//! # Invariants
//! - No table state survives between calls; every call reloads storage.
//! - Mutations always rewrite the full (unfiltered) table.
//! - A failed save leaves storage at its last successful write.
//! - Field contents are not validated: blank DNI or free-form phone
//!   numbers are accepted as typed.

use crate::export::{to_delimited, to_xlsx, ExportError};
use crate::model::table::{Record, Row, Table};
use crate::repo::table_repo::{RepoError, TableRepository};
use crate::search::filter::filter_table;
use crate::service::form::{form_fields, prefill_edit_form, EditForm, FormField, FormValues};
use crate::service::metrics::{registry_metrics, status_distribution, RegistryMetrics, StatusCount};
use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Workflow error for record actions.
#[derive(Debug)]
pub enum WorkflowError {
    /// Storage could not be read or written.
    Repo(RepoError),
    /// Download encoding failed.
    Export(ExportError),
    /// The current search matched nothing, so there is nothing to select.
    NoVisibleRows,
    /// Selection outside the visible index range.
    IndexOutOfRange { index: usize, min: usize, max: usize },
    /// Selection inside the range but filtered out by the current search.
    RowNotVisible(usize),
    /// Submitted value for a column the registry does not have.
    UnknownColumn(String),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::NoVisibleRows => write!(f, "no records match the current search"),
            Self::IndexOutOfRange { index, min, max } => {
                write!(f, "row index {index} is outside the visible range {min}..={max}")
            }
            Self::RowNotVisible(index) => {
                write!(f, "row index {index} is not part of the current search results")
            }
            Self::UnknownColumn(column) => write!(f, "unknown column `{column}`"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkflowError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ExportError> for WorkflowError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Inclusive range of table indices the row selector may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexBounds {
    pub min: usize,
    pub max: usize,
}

impl IndexBounds {
    pub fn contains(&self, index: usize) -> bool {
        (self.min..=self.max).contains(&index)
    }
}

/// Selector bounds for a filtered table; `None` when it is empty.
pub fn selection_bounds(filtered: &Table) -> Option<IndexBounds> {
    let min = filtered.rows().iter().map(|row| row.index).min()?;
    let max = filtered.rows().iter().map(|row| row.index).max()?;
    Some(IndexBounds { min, max })
}

/// One loaded registry together with the rows visible under a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryView {
    pub query: String,
    pub table: Table,
    pub filtered: Table,
}

impl RegistryView {
    pub fn new(table: Table, query: impl Into<String>) -> Self {
        let query = query.into();
        let filtered = filter_table(&table, &query);
        Self {
            query,
            table,
            filtered,
        }
    }

    pub fn metrics(&self) -> RegistryMetrics {
        registry_metrics(&self.table, &self.filtered)
    }

    pub fn status_distribution(&self) -> Option<Vec<StatusCount>> {
        status_distribution(&self.table)
    }

    pub fn selection_bounds(&self) -> Option<IndexBounds> {
        selection_bounds(&self.filtered)
    }

    /// Resolves a selector value to a visible row.
    pub fn select(&self, index: usize) -> WorkflowResult<&Row> {
        let bounds = self.selection_bounds().ok_or(WorkflowError::NoVisibleRows)?;
        if !bounds.contains(index) {
            return Err(WorkflowError::IndexOutOfRange {
                index,
                min: bounds.min,
                max: bounds.max,
            });
        }
        self.filtered
            .row(index)
            .ok_or(WorkflowError::RowNotVisible(index))
    }
}

/// Use-case service for the registry CRUD and export workflow.
pub struct RecordService<R: TableRepository> {
    repo: R,
}

impl<R: TableRepository> RecordService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Loads the registry and applies the search query.
    pub fn view(&self, query: &str) -> WorkflowResult<RegistryView> {
        let table = self.repo.load_table()?;
        Ok(RegistryView::new(table, query))
    }

    /// Blank add form, one field per stored column.
    pub fn add_form(&self) -> WorkflowResult<Vec<FormField>> {
        let table = self.repo.load_table()?;
        Ok(form_fields(table.columns()))
    }

    /// Appends one record built from `values` and persists the registry.
    ///
    /// Columns missing from `values` are stored as empty text. Returns the
    /// index of the new row.
    pub fn add_record(&self, values: &FormValues) -> WorkflowResult<usize> {
        let started_at = Instant::now();
        let mut table = self.repo.load_table()?;
        ensure_known_columns(&table, values)?;

        let record: Record = table
            .columns()
            .iter()
            .map(|column| {
                let cell = values
                    .get(column)
                    .map(|value| value.to_cell())
                    .unwrap_or_default();
                (column.clone(), cell)
            })
            .collect();
        let index = table.push(record);
        self.repo.save_table(&table)?;

        info!(
            "event=record_add module=service status=ok index={} rows={} duration_ms={}",
            index,
            table.len(),
            started_at.elapsed().as_millis()
        );
        Ok(index)
    }

    /// Edit form for a visible row, dates pre-parsed with today's fallback.
    pub fn edit_form(&self, query: &str, index: usize) -> WorkflowResult<EditForm> {
        self.edit_form_as_of(query, index, today())
    }

    /// Same as [`Self::edit_form`] with an explicit fallback date.
    pub fn edit_form_as_of(
        &self,
        query: &str,
        index: usize,
        today: NaiveDate,
    ) -> WorkflowResult<EditForm> {
        let view = self.view(query)?;
        let row = view.select(index)?;
        Ok(prefill_edit_form(view.table.columns(), row.index, &row.record, today))
    }

    /// Submits the edit form of a visible row.
    ///
    /// Every column is written back: overrides where given, otherwise the
    /// pre-populated value (so unparseable dates are replaced by today).
    pub fn edit_record(
        &self,
        query: &str,
        index: usize,
        overrides: &FormValues,
    ) -> WorkflowResult<()> {
        self.edit_record_as_of(query, index, overrides, today())
    }

    /// Same as [`Self::edit_record`] with an explicit fallback date.
    pub fn edit_record_as_of(
        &self,
        query: &str,
        index: usize,
        overrides: &FormValues,
        today: NaiveDate,
    ) -> WorkflowResult<()> {
        let started_at = Instant::now();
        let mut view = self.view(query)?;
        ensure_known_columns(&view.table, overrides)?;

        let form = {
            let row = view.select(index)?;
            prefill_edit_form(view.table.columns(), row.index, &row.record, today)
        };
        let values = form.submitted_values(overrides);

        let row = view
            .table
            .row_mut(index)
            .ok_or(WorkflowError::RowNotVisible(index))?;
        for (column, value) in &values {
            row.record.set(column.clone(), value.to_cell());
        }
        self.repo.save_table(&view.table)?;

        info!(
            "event=record_edit module=service status=ok index={} fields={} duration_ms={}",
            index,
            values.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Deletes a visible row, reindexes the rest and persists the registry.
    ///
    /// Returns the removed record.
    pub fn delete_record(&self, query: &str, index: usize) -> WorkflowResult<Record> {
        let started_at = Instant::now();
        let mut view = self.view(query)?;
        view.select(index)?;

        let removed = view
            .table
            .remove_row(index)
            .ok_or(WorkflowError::RowNotVisible(index))?;
        self.repo.save_table(&view.table)?;

        info!(
            "event=record_delete module=service status=ok index={} rows={} duration_ms={}",
            index,
            view.table.len(),
            started_at.elapsed().as_millis()
        );
        Ok(removed)
    }

    /// `;`-delimited export of the rows matching `query`.
    pub fn export_csv(&self, query: &str) -> WorkflowResult<Vec<u8>> {
        let view = self.view(query)?;
        Ok(to_delimited(&view.filtered)?)
    }

    /// Workbook export of the rows matching `query`.
    pub fn export_xlsx(&self, query: &str) -> WorkflowResult<Vec<u8>> {
        let view = self.view(query)?;
        Ok(to_xlsx(&view.filtered)?)
    }
}

fn ensure_known_columns(table: &Table, values: &FormValues) -> WorkflowResult<()> {
    match values.keys().find(|column| !table.has_column(column)) {
        Some(column) => Err(WorkflowError::UnknownColumn(column.clone())),
        None => Ok(()),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
