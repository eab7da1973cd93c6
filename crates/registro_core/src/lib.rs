//! Core logic for the ambulatory commerce registry.
//!
//! The registry is a single `;`-delimited file. Every action loads it,
//! optionally filters it by a free-text query, mutates it and rewrites it
//! in full. This crate owns that cycle plus CSV/XLSX exports; presentation
//! code only renders what it returns.

pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use export::{to_delimited, to_xlsx, ExportError, ExportResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::column::{
    export_label, form_label, is_date_column, is_unnamed, normalize_header, CANONICAL_COLUMNS,
};
pub use model::date::{format_iso, parse_day_first};
pub use model::table::{Record, Row, Table};
pub use repo::table_repo::{
    load_table, save_table, CsvTableRepository, RepoError, RepoResult, TableRepository,
    DEFAULT_DATA_PATH,
};
pub use search::filter::filter_table;
pub use service::form::{
    form_fields, EditForm, FieldKind, FieldSide, FormField, FormValue, FormValues, PrefilledField,
};
pub use service::metrics::{RegistryMetrics, StatusCount};
pub use service::record_service::{
    selection_bounds, IndexBounds, RecordService, RegistryView, WorkflowError, WorkflowResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
