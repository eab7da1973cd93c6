//! Column identifiers and the canonical label catalog.
//!
//! # Responsibility
//! - Derive stable column identifiers from raw file headers.
//! - Map identifiers to human-readable labels for forms and exports.
//!
//! # Invariants
//! - `normalize_header` is idempotent.
//! - Identifiers starting with `unnamed` are index artifacts and never kept.

use std::borrow::Cow;

/// Prefix that marks stray index columns left behind by earlier exports.
pub const UNNAMED_PREFIX: &str = "unnamed";

/// Column holding the authorization state of a record.
pub const STATUS_COLUMN: &str = "estado";

/// Canonical identifier → display label pairs, in display order.
pub const CANONICAL_COLUMNS: [(&str, &str); 20] = [
    ("estado", "ESTADO"),
    ("n°", "N°"),
    ("fecha_de_ingreso", "FECHA DE INGRESO"),
    ("n°_de_documento_simple", "N° DE DOCUMENTO SIMPLE"),
    ("asunto", "ASUNTO"),
    ("nombre_y_apellido", "NOMBRE Y APELLIDO"),
    ("dni", "DNI"),
    ("domicilio_fiscal", "DOMICILIO FISCAL"),
    ("giro_o_motivo_de_la_solicitud", "GIRO O MOTIVO DE LA SOLICITUD"),
    ("ubicacion", "UBICACIÓN A SOLICITAR"),
    ("n°_de_celular", "N° DE CELULAR"),
    ("procedente_/_improcedente", "PROCEDENTE / IMPROCEDENTE"),
    ("n°_de_carta", "N° DE CARTA"),
    ("fecha_de_la_carta", "FECHA DE LA CARTA"),
    ("fecha_de_notificacion", "FECHA DE NOTIFICACIÓN"),
    ("anexo", "ANEXO"),
    ("fecha_extra", "FECHA"),
    ("asunto_extra", "ASUNTO"),
    ("folios", "FOLIOS"),
    ("archivo", "ARCHIVO"),
];

/// Normalizes one raw header into a column identifier.
///
/// Trims, lowercases, then replaces spaces with `_`, `ñ` with `n` and `/`
/// with `_`, in that order.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('ñ', "n")
        .replace('/', "_")
}

/// Normalizes a full header row.
///
/// Empty headers get the `unnamed:_<position>` artifact name so they are
/// stripped like any other index leftover. Repeated identifiers receive
/// `.1`, `.2`, ... suffixes in header order.
pub fn normalize_headers<'a, I>(raw_headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut normalized: Vec<String> = Vec::new();

    for (position, raw) in raw_headers.into_iter().enumerate() {
        let raw = if position == 0 {
            raw.trim_start_matches('\u{feff}')
        } else {
            raw
        };

        let base = if raw.trim().is_empty() {
            format!("{UNNAMED_PREFIX}:_{position}")
        } else {
            normalize_header(raw)
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while normalized.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        normalized.push(candidate);
    }

    normalized
}

/// Returns whether an identifier is an index artifact that must be dropped.
pub fn is_unnamed(column: &str) -> bool {
    column.starts_with(UNNAMED_PREFIX)
}

/// Returns whether a column holds dates (edited through a date picker).
pub fn is_date_column(column: &str) -> bool {
    column.contains("fecha")
}

/// Looks up the canonical display label for an identifier.
///
/// Catalog keys are compared in normalized form, so `procedente_/_improcedente`
/// also labels the `procedente___improcedente` column a real header yields.
pub fn canonical_label(column: &str) -> Option<&'static str> {
    CANONICAL_COLUMNS
        .iter()
        .find(|(id, _)| *id == column || normalize_header(id) == column)
        .map(|(_, label)| *label)
}

/// Label used for form inputs and on-screen tables.
///
/// Falls back to the title-cased identifier for unknown columns.
pub fn form_label(column: &str) -> Cow<'static, str> {
    match canonical_label(column) {
        Some(label) => Cow::Borrowed(label),
        None => Cow::Owned(title_case(&column.replace('_', " "))),
    }
}

/// Label used for spreadsheet headers.
///
/// Falls back to the identifier itself for unknown columns.
pub fn export_label(column: &str) -> Cow<'_, str> {
    match canonical_label(column) {
        Some(label) => Cow::Borrowed(label),
        None => Cow::Borrowed(column),
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }

    out
}
