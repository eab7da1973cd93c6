//! Add/edit form descriptors and submitted values.
//!
//! # Responsibility
//! - Describe one input per column (label, widget kind, layout side).
//! - Pre-populate edit forms from stored rows.
//! - Convert submitted values back into stored cell text.
//!
//! # Invariants
//! - Date inputs always resolve to a concrete date in edit forms; unparseable
//!   or empty stored text falls back to the supplied `today`.
//! - Submitted dates are stored as `YYYY-MM-DD`.

use crate::model::column::{form_label, is_date_column};
use crate::model::date::{format_iso, parse_day_first};
use crate::model::table::Record;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Submitted form values keyed by column identifier.
pub type FormValues = BTreeMap<String, FormValue>;

/// Input widget used for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text input.
    Text,
    /// Date-only picker.
    Date,
}

/// Layout column for the two-wide form grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSide {
    Left,
    Right,
}

/// One form input bound to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub column: String,
    pub label: String,
    pub kind: FieldKind,
    pub side: FieldSide,
}

/// A value entered into a form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum FormValue {
    Text(String),
    Date(NaiveDate),
}

impl FormValue {
    /// Stored cell text for this value.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Date(date) => format_iso(*date),
        }
    }

    /// Parses raw input for a field of the given kind.
    ///
    /// Date input that does not parse, blank included, is kept as typed.
    pub fn parse_for(kind: FieldKind, raw: &str) -> Self {
        match kind {
            FieldKind::Date => match parse_day_first(raw) {
                Some(date) => Self::Date(date),
                None => Self::Text(raw.to_string()),
            },
            FieldKind::Text => Self::Text(raw.to_string()),
        }
    }
}

/// Form input with its pre-populated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefilledField {
    pub field: FormField,
    pub value: FormValue,
}

/// Edit form for one selected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditForm {
    /// Table index of the row being edited.
    pub index: usize,
    pub fields: Vec<PrefilledField>,
}

impl EditForm {
    /// Final values after applying caller overrides on top of the prefill.
    pub fn submitted_values(&self, overrides: &FormValues) -> FormValues {
        self.fields
            .iter()
            .map(|prefilled| {
                let value = overrides
                    .get(&prefilled.field.column)
                    .cloned()
                    .unwrap_or_else(|| prefilled.value.clone());
                (prefilled.field.column.clone(), value)
            })
            .collect()
    }
}

/// Builds one input descriptor per column, alternating left/right.
pub fn form_fields(columns: &[String]) -> Vec<FormField> {
    columns
        .iter()
        .enumerate()
        .map(|(position, column)| FormField {
            column: column.clone(),
            label: form_label(column).into_owned(),
            kind: field_kind(column),
            side: if position % 2 == 0 {
                FieldSide::Left
            } else {
                FieldSide::Right
            },
        })
        .collect()
}

/// Widget kind for a column.
pub fn field_kind(column: &str) -> FieldKind {
    if is_date_column(column) {
        FieldKind::Date
    } else {
        FieldKind::Text
    }
}

/// Pre-populates an edit form from a stored record.
pub fn prefill_edit_form(
    columns: &[String],
    index: usize,
    record: &Record,
    today: NaiveDate,
) -> EditForm {
    let fields = form_fields(columns)
        .into_iter()
        .map(|field| {
            let cell = record.get(&field.column);
            let value = match field.kind {
                FieldKind::Date => FormValue::Date(parse_day_first(cell).unwrap_or(today)),
                FieldKind::Text => FormValue::Text(cell.to_string()),
            };
            PrefilledField { field, value }
        })
        .collect();

    EditForm { index, fields }
}
