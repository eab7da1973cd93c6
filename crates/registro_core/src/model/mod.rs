//! Registry domain model.
//!
//! # Responsibility
//! - Define the schema-free table shape shared by storage, search and
//!   workflow code.
//! - Own the column catalog: identifier normalization and display labels.
//!
//! # Invariants
//! - Every cell is text; no type inference happens anywhere in core.
//! - Column identifiers are normalized before they reach a `Table`.

pub mod column;
pub mod date;
pub mod table;
