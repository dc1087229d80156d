//! Table cleaning, run on raw imports before reconciliation.

use std::collections::HashSet;

use crate::column::{resolve, Role};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::Table;
use crate::normalize::normalize;

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Keep only the first row per part number (used when preparing a master).
    pub dedupe_part_numbers: bool,
}

#[derive(Debug, Clone)]
pub struct CleanReport {
    pub table: Table,
    pub original_rows: usize,
    pub dropped_empty: usize,
    pub dropped_duplicates: usize,
}

/// Trim cells, normalize part numbers, drop rows without one, and move the
/// part-number column to the front.
///
/// Columns whose header mentions "date" keep their cells verbatim.
pub fn clean_table(table: &Table, config: &ReconConfig, options: CleanOptions) -> Result<CleanReport, ReconError> {
    let pn_col = resolve(table.headers(), config.columns.for_role(Role::PartNumber)).ok_or_else(|| {
        ReconError::MissingColumn { table: "input".into(), role: Role::PartNumber.as_str().into() }
    })?;

    let date_cols: Vec<bool> = table
        .headers()
        .iter()
        .map(|h| h.to_lowercase().contains("date"))
        .collect();

    let mut cleaned = Table::new(table.headers().to_vec());
    let mut seen: HashSet<String> = HashSet::new();
    let mut dropped_empty = 0;
    let mut dropped_duplicates = 0;

    for row in table.rows() {
        let part = normalize(&row[pn_col]);
        if part.is_empty() {
            dropped_empty += 1;
            continue;
        }
        if options.dedupe_part_numbers && !seen.insert(part.clone()) {
            dropped_duplicates += 1;
            continue;
        }

        let cells = row
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                if col == pn_col {
                    part.clone()
                } else if date_cols[col] {
                    cell.clone()
                } else {
                    cell.trim().to_string()
                }
            })
            .collect();
        cleaned.push_row(cells)?;
    }

    let order = column_order(cleaned.headers(), pn_col, &config.clean.preferred_columns);
    let table_out = cleaned.select_columns(&order);

    if dropped_empty > 0 || dropped_duplicates > 0 {
        log::info!(
            "cleaned {} rows: {dropped_empty} without part number, {dropped_duplicates} duplicates dropped",
            table.len()
        );
    }

    Ok(CleanReport {
        table: table_out,
        original_rows: table.len(),
        dropped_empty,
        dropped_duplicates,
    })
}

/// Part number first, then preferred columns that exist, then the rest.
fn column_order(headers: &[String], pn_col: usize, preferred: &[String]) -> Vec<usize> {
    let mut order = vec![pn_col];
    for name in preferred {
        if let Some(col) = headers.iter().position(|h| h == name) {
            if !order.contains(&col) {
                order.push(col);
            }
        }
    }
    order.extend((0..headers.len()).filter(|c| !order.contains(c)).collect::<Vec<_>>());
    order
}
