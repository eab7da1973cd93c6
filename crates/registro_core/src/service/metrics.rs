//! Dashboard counters and chart data.

use crate::model::column::STATUS_COLUMN;
use crate::model::table::Table;
use serde::Serialize;

pub const STATUS_AUTHORIZED: &str = "AUTORIZADO";
pub const STATUS_WAITING: &str = "ESPERA";

/// Headline counters shown above the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryMetrics {
    /// Rows matching the current search.
    pub total: usize,
    /// Rows of the full registry with status `AUTORIZADO`.
    pub authorized: Option<usize>,
    /// Rows of the full registry with status `ESPERA`.
    pub waiting: Option<usize>,
}

/// One bar of the status distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Computes counters. Status counts are `None` when the registry has no
/// status column.
pub fn registry_metrics(full: &Table, filtered: &Table) -> RegistryMetrics {
    let count_status = |wanted: &str| {
        full.has_column(STATUS_COLUMN).then(|| {
            full.column_values(STATUS_COLUMN)
                .filter(|status| *status == wanted)
                .count()
        })
    };

    RegistryMetrics {
        total: filtered.len(),
        authorized: count_status(STATUS_AUTHORIZED),
        waiting: count_status(STATUS_WAITING),
    }
}

/// Counts non-empty status values, most frequent first, ties in order of
/// first appearance.
pub fn status_distribution(table: &Table) -> Option<Vec<StatusCount>> {
    if !table.has_column(STATUS_COLUMN) {
        return None;
    }

    let mut counts: Vec<StatusCount> = Vec::new();
    for status in table.column_values(STATUS_COLUMN) {
        if status.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|entry| entry.status == status) {
            Some(entry) => entry.count += 1,
            None => counts.push(StatusCount {
                status: status.to_string(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    Some(counts)
}
