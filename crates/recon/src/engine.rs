use chrono::Utc;

use crate::changelog::ChangeLog;
use crate::column::{Role, RoleMap};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::lookup::{lookup, matching_rows};
use crate::model::{Action, ChangeLogEntry, ReconMeta, ReconResult, Status, StatusCounts, Table};
use crate::normalize::{is_valid_format_with, normalize};
use crate::policy::decide;

/// Header of the notes column added to the working copy when none resolves.
pub const NOTES_HEADER: &str = "Notes";

const DETAIL_PROMOTED: &str = "Statut mis à jour de X vers D";
const DETAIL_DUPLICATE: &str = "Nouvelle ligne ajoutée - doublon détecté";
const DETAIL_FORMAT_ERROR: &str = "Erreur de format détectée";
const DETAIL_NOT_FOUND: &str = "PN introuvable dans Master BOM";

/// Reconcile `working` against `reference` in a single pass.
///
/// The reference is moved in and handed back in the result with status
/// promotions applied. The working table is never modified; the result holds
/// a copy extended with synthesized rows. A missing part-number column in
/// either table fails the run before anything is mutated.
pub fn run(config: &ReconConfig, working: &Table, mut reference: Table) -> Result<ReconResult, ReconError> {
    let ref_roles = RoleMap::resolve(&reference, &config.columns);
    let work_roles = RoleMap::resolve(working, &config.columns);
    ref_roles.require(Role::PartNumber, "reference")?;
    let work_pn = work_roles.require(Role::PartNumber, "working")?;

    // Growth buffer: synthesized rows land here, never in the iterated snapshot
    let mut output = working.clone();
    let notes_col = match work_roles.notes {
        Some(col) => col,
        None => output.add_column(NOTES_HEADER),
    };

    let min_len = config.validation.min_part_number_length;
    let mut counts = StatusCounts::default();
    let mut changelog = ChangeLog::new();
    let mut promoted_rows = 0;

    for index in 0..working.len() {
        let part = normalize(working.cell(index, work_pn));
        let project = work_roles
            .project
            .map(|col| working.cell(index, col).trim())
            .filter(|p| !p.is_empty());

        let status = lookup(&reference, &ref_roles, &part, project);
        counts.record(&status);

        let decision = decide(&status, is_valid_format_with(&part, min_len), &config.comments);
        log::debug!("row {index}: '{part}' ({}) -> {status} -> {}", project.unwrap_or("-"), decision.action);

        let entry = |line_index: usize, status: Status, action: Action, detail: String| ChangeLogEntry {
            line_index,
            source_index: index,
            part_identifier: part.clone(),
            project: project.unwrap_or_default().to_string(),
            status,
            action,
            detail,
            timestamp: Utc::now(),
        };

        match decision.action {
            Action::NoAction => {}

            Action::UpdateToDeleted => match promote(&mut reference, &ref_roles, &part, project) {
                Ok(n) => {
                    promoted_rows += n;
                    if let Some(comment) = decision.comment {
                        output.set_cell(index, notes_col, comment);
                    }
                    changelog.record(entry(index, status, Action::UpdateToDeleted, DETAIL_PROMOTED.into()));
                }
                Err(msg) => {
                    log::warn!("row {index}: cannot promote '{part}': {msg}");
                    changelog.record(entry(
                        index,
                        status,
                        Action::ManualReview,
                        format!("Erreur de traitement: {msg}"),
                    ));
                }
            },

            Action::AddNewLine | Action::AddNewLineError => {
                let line = output.push_blank_row();
                if !decision.blank_identity {
                    output.set_cell(line, work_pn, part.as_str());
                    if let (Some(col), Some(p)) = (work_roles.project, project) {
                        output.set_cell(line, col, p);
                    }
                }
                if let Some(comment) = decision.comment {
                    output.set_cell(line, notes_col, comment);
                }

                let detail = match (decision.action, decision.blank_identity) {
                    (Action::AddNewLine, _) => DETAIL_DUPLICATE,
                    (_, true) => DETAIL_FORMAT_ERROR,
                    (_, false) => DETAIL_NOT_FOUND,
                };
                changelog.record(entry(line, status, decision.action, detail.into()));
            }

            Action::ManualReview => {
                let detail = format!("Statut « {status} » hors domaine – vérification manuelle");
                changelog.record(entry(index, status, Action::ManualReview, detail));
            }
        }
    }

    let meta = ReconMeta {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: Utc::now().to_rfc3339(),
        working_rows: working.len(),
        reference_rows: reference.len(),
        synthesized_rows: output.len() - working.len(),
        promoted_rows,
    };

    log::info!(
        "reconciled {} rows: D={} X={} 0={} NaN={} other={}, {} synthesized, {} promoted",
        meta.working_rows,
        counts.deleted,
        counts.to_replace,
        counts.duplicate,
        counts.unknown,
        counts.unrecognized,
        meta.synthesized_rows,
        meta.promoted_rows,
    );

    Ok(ReconResult { meta, reference, working: output, counts, changelog })
}

/// Set the status of the rows matching `part`/`project` to `D`.
///
/// A `ToReplace` status implies exactly one candidate, so this touches a
/// single row.
fn promote(
    reference: &mut Table,
    roles: &RoleMap,
    part: &str,
    project: Option<&str>,
) -> Result<usize, String> {
    let status_col = roles.status.ok_or("reference has no status column")?;
    let rows = matching_rows(reference, roles, part, project);
    if rows.is_empty() {
        return Err("no matching reference row".into());
    }
    for &row in &rows {
        reference.set_cell(row, status_col, Status::DELETED);
    }
    Ok(rows.len())
}
