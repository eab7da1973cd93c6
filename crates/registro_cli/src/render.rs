//! Plain-text rendering of registry views.

use registro_core::{form_label, EditForm, FieldKind, FormField, RegistryMetrics, StatusCount, Table};
use std::fmt::Write as _;

const CHART_WIDTH: usize = 40;
const EMPTY_MESSAGE: &str = "No hay registros.\n";

/// Tab-separated table with the row index first and display labels as
/// headers.
pub fn records(table: &Table) -> String {
    if table.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let mut out = String::from("ÍNDICE");
    for column in table.columns() {
        out.push('\t');
        out.push_str(&form_label(column));
    }
    out.push('\n');

    for row in table.rows() {
        let _ = write!(out, "{}", row.index);
        for value in table.values(&row.record) {
            out.push('\t');
            out.push_str(&value.replace(['\t', '\n', '\r'], " "));
        }
        out.push('\n');
    }
    out
}

pub fn metrics(metrics: &RegistryMetrics) -> String {
    let mut out = format!("Total registros: {}\n", metrics.total);
    if let Some(authorized) = metrics.authorized {
        let _ = writeln!(out, "Autorizados: {authorized}");
    }
    if let Some(waiting) = metrics.waiting {
        let _ = writeln!(out, "En espera: {waiting}");
    }
    out
}

/// Horizontal bars scaled so the largest count spans `CHART_WIDTH` cells.
pub fn bar_chart(bars: &[StatusCount]) -> String {
    let mut out = String::from("\nDistribución por Estado\n");
    let Some(max) = bars.iter().map(|bar| bar.count).max() else {
        return out;
    };
    let label_width = bars
        .iter()
        .map(|bar| bar.status.chars().count())
        .max()
        .unwrap_or(0);

    for bar in bars {
        let cells = (bar.count * CHART_WIDTH).div_ceil(max);
        let padding = label_width - bar.status.chars().count();
        let _ = writeln!(
            out,
            "{}{} | {} {}",
            bar.status,
            " ".repeat(padding),
            "█".repeat(cells),
            bar.count
        );
    }
    out
}

pub fn fields(fields: &[FormField]) -> String {
    let mut out = String::new();
    for field in fields {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            field.column,
            field.label,
            kind_name(field.kind)
        );
    }
    out
}

pub fn edit_form(form: &EditForm) -> String {
    let mut out = format!("Registro {}\n", form.index);
    for prefilled in &form.fields {
        let _ = writeln!(
            out,
            "{} ({}): {}",
            prefilled.field.label,
            prefilled.field.column,
            prefilled.value.to_cell()
        );
    }
    out
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "texto",
        FieldKind::Date => "fecha",
    }
}

#[cfg(test)]
mod tests {
    use super::{bar_chart, records};
    use registro_core::{Record, StatusCount, Table};

    #[test]
    fn empty_table_shows_message() {
        assert_eq!(records(&Table::new(vec!["estado".into()])), "No hay registros.\n");
    }

    #[test]
    fn records_use_labels_and_indices() {
        let table = Table::from_records(
            vec!["estado".into(), "codigo".into()],
            [[("estado", "ESPERA"), ("codigo", "a\tb")].into_iter().collect::<Record>()],
        );
        assert_eq!(records(&table), "ÍNDICE\tESTADO\tCodigo\n0\tESPERA\ta b\n");
    }

    #[test]
    fn largest_bar_fills_the_chart() {
        let chart = bar_chart(&[
            StatusCount { status: "AUTORIZADO".into(), count: 4 },
            StatusCount { status: "ESPERA".into(), count: 1 },
        ]);
        assert!(chart.contains(&format!("AUTORIZADO | {} 4", "█".repeat(40))));
        assert!(chart.contains(&format!("ESPERA     | {} 1", "█".repeat(10))));
    }
}
