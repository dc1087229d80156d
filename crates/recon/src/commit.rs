use std::collections::HashSet;

use crate::column::{Role, RoleMap};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::{Action, ReconResult, Table};
use crate::normalize::{is_valid_format_with, normalize};

/// Append not-found part numbers to the result's reference table.
///
/// Only entries logged as `add_new_line_error` whose identifier passes the
/// format check qualify (format errors are skipped). Each new reference row gets the part
/// number, the project, the configured `new_row_status`, and any cell of the
/// source working row whose header also exists in the reference. A
/// part/project pair is appended once, and never when the reference already
/// holds it.
///
/// This is an explicit follow-up step: `run` itself never inserts into the
/// reference. Returns the number of rows added.
pub fn commit_additions(
    result: &mut ReconResult,
    working: &Table,
    config: &ReconConfig,
) -> Result<usize, ReconError> {
    let ref_roles = RoleMap::resolve(&result.reference, &config.columns);
    let ref_pn = ref_roles.require(Role::PartNumber, "reference")?;

    let mut existing: HashSet<(String, String)> = HashSet::new();
    for row in 0..result.reference.len() {
        existing.insert(identity(&result.reference, &ref_roles, row, ref_pn));
    }

    let min_len = config.validation.min_part_number_length;
    let mut added = 0;
    for entry in result.changelog.entries() {
        // Format errors log their raw identifier; only true not-found rows qualify
        if entry.action != Action::AddNewLineError || !is_valid_format_with(&entry.part_identifier, min_len) {
            continue;
        }
        let project = match ref_roles.project {
            Some(_) => entry.project.clone(),
            None => String::new(),
        };
        if !existing.insert((entry.part_identifier.clone(), project.clone())) {
            log::debug!("commit: '{}' already in reference, skipped", entry.part_identifier);
            continue;
        }

        let mut cells = vec![String::new(); result.reference.width()];
        if let Some(source) = working.row(entry.source_index) {
            for (col, header) in result.reference.headers().iter().enumerate() {
                if let Some(src_col) = working.column_position(header) {
                    cells[col] = source[src_col].clone();
                }
            }
        } else {
            log::warn!("commit: source row {} missing from working table", entry.source_index);
        }

        cells[ref_pn] = entry.part_identifier.clone();
        if let Some(col) = ref_roles.project {
            cells[col] = project;
        }
        if let Some(col) = ref_roles.status {
            cells[col] = config.commit.new_row_status.clone();
        }
        // Notes are produced by the run, not copied into the reference
        if let Some(col) = ref_roles.notes {
            cells[col].clear();
        }

        result.reference.push_row(cells)?;
        added += 1;
    }

    if added > 0 {
        log::info!("committed {added} new part number(s) to the reference");
    }
    Ok(added)
}

fn identity(table: &Table, roles: &RoleMap, row: usize, pn_col: usize) -> (String, String) {
    let project = roles
        .project
        .map(|col| table.cell(row, col).trim().to_string())
        .unwrap_or_default();
    (normalize(table.cell(row, pn_col)), project)
}
