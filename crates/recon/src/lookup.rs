use crate::column::RoleMap;
use crate::model::{Status, Table};
use crate::normalize::normalize;

/// Reference rows matching an identifier, optionally narrowed by project.
///
/// The identifier is compared against the normalized part-number cell with
/// exact, case-sensitive equality. The project filter applies only when a
/// non-blank project is given and the reference has a project column.
pub fn matching_rows(
    reference: &Table,
    roles: &RoleMap,
    part_identifier: &str,
    project: Option<&str>,
) -> Vec<usize> {
    let Some(pn_col) = roles.part_number else {
        return Vec::new();
    };
    let part_identifier = part_identifier.trim();
    let project = project.map(str::trim).filter(|p| !p.is_empty());

    (0..reference.len())
        .filter(|&row| normalize(reference.cell(row, pn_col)) == part_identifier)
        .filter(|&row| match (project, roles.project) {
            (Some(p), Some(proj_col)) => reference.cell(row, proj_col).trim() == p,
            _ => true,
        })
        .collect()
}

/// Derive the reconciliation status of one identifier.
///
/// Two or more candidates are always `Duplicate`, whatever they store.
pub fn lookup(
    reference: &Table,
    roles: &RoleMap,
    part_identifier: &str,
    project: Option<&str>,
) -> Status {
    if roles.part_number.is_none() {
        return Status::Unknown;
    }

    let candidates = matching_rows(reference, roles, part_identifier, project);
    match candidates.as_slice() {
        [] => Status::Unknown,
        [row] => match roles.status {
            Some(status_col) => Status::parse(reference.cell(*row, status_col)),
            None => Status::Unknown,
        },
        _ => Status::Duplicate,
    }
}
