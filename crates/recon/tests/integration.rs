use bomsync_recon::clean::{clean_table, CleanOptions};
use bomsync_recon::commit::commit_additions;
use bomsync_recon::lookup::lookup;
use bomsync_recon::column::RoleMap;
use bomsync_recon::{run, Action, ReconConfig, Status, Table};

fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    Table::from_rows(
        headers.iter().map(|s| s.to_string()).collect(),
        rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect(),
    )
    .unwrap()
}

fn master() -> Table {
    table(
        &["Part Number", "Projet", "Statut", "Description", "Fournisseur", "Prix"],
        &[
            &["PN001", "PROJ_A", "D", "Résistance 10K", "Fournisseur A", "0.10"],
            &["PN002", "PROJ_A", "X", "Condensateur 100nF", "Fournisseur B", "0.05"],
            &["PN003", "PROJ_B", "D", "LED Rouge", "Fournisseur A", "0.25"],
            &["PN004", "PROJ_B", "0", "Connecteur USB", "Fournisseur C", "2.50"],
            &["PN005", "PROJ_C", "X", "Microcontrôleur", "Fournisseur D", "15.00"],
            &["PN006", "PROJ_C", "D", "Écran LCD", "Fournisseur B", "25.00"],
            &["PN007", "PROJ_D", "X", "Capteur Temp", "Fournisseur A", "8.50"],
            &["PN008", "PROJ_D", "D", "Alimentation", "Fournisseur C", "12.00"],
            &["PN009", "PROJ_E", "0", "Boîtier", "Fournisseur D", "5.00"],
            &["PN010", "PROJ_E", "D", "Câble", "Fournisseur A", "3.50"],
        ],
    )
}

fn incoming() -> Table {
    table(
        &["Part Number", "Projet", "Quantité", "Notes"],
        &[
            &["PN001", "PROJ_A", "10", ""],
            &["PN002", "PROJ_A", "5", ""],
            &["PN011", "PROJ_F", "2", ""],
            &["PN004", "PROJ_B", "8", ""],
            &["PN005", "PROJ_C", "3", ""],
            &["", "PROJ_G", "1", ""],
            &["PN012", "PROJ_H", "4", ""],
            &["PN006", "PROJ_C", "6", ""],
            &["PN013", "PROJ_I", "2", ""],
        ],
    )
}

// -------------------------------------------------------------------------
// Full pass over a mixed BOM
// -------------------------------------------------------------------------

#[test]
fn mixed_bom_counts_and_changelog() {
    let working = incoming();
    let result = run(&ReconConfig::default(), &working, master()).unwrap();

    assert_eq!(result.counts.deleted, 2);
    assert_eq!(result.counts.to_replace, 2);
    assert_eq!(result.counts.duplicate, 1);
    assert_eq!(result.counts.unknown, 4);
    assert_eq!(result.counts.unrecognized, 0);

    // 1 duplicate + 4 unknown rows appended after the 9 originals
    assert_eq!(result.working.len(), 14);
    assert_eq!(result.meta.synthesized_rows, 5);

    let lines: Vec<(usize, Action)> = result
        .changelog
        .entries()
        .iter()
        .map(|e| (e.line_index, e.action))
        .collect();
    assert_eq!(
        lines,
        vec![
            (1, Action::UpdateToDeleted),
            (9, Action::AddNewLineError),
            (10, Action::AddNewLine),
            (4, Action::UpdateToDeleted),
            (11, Action::AddNewLineError),
            (12, Action::AddNewLineError),
            (13, Action::AddNewLineError),
        ]
    );

    // Logged statuses exclude the no-action rows
    let logged = result.changelog.summarize();
    assert_eq!(logged.deleted, 0);
    assert_eq!(logged.to_replace, 2);
    assert_eq!(logged.duplicate, 1);
    assert_eq!(logged.unknown, 4);
}

#[test]
fn mixed_bom_reference_mutations() {
    let working = incoming();
    let result = run(&ReconConfig::default(), &working, master()).unwrap();

    let statuses: Vec<&str> = (0..result.reference.len()).map(|r| result.reference.cell(r, 2)).collect();
    // PN002 and PN005 promoted; PN007 (X) untouched because it was never looked up
    assert_eq!(statuses, vec!["D", "D", "D", "0", "D", "D", "X", "D", "0", "D"]);
    assert_eq!(result.reference.len(), 10);
    // Pass-through columns untouched
    assert_eq!(result.reference.cell(1, 3), "Condensateur 100nF");
}

#[test]
fn mixed_bom_synthesized_rows() {
    let working = incoming();
    let result = run(&ReconConfig::default(), &working, master()).unwrap();
    let w = &result.working;

    // PN011 not found: identity preserved
    assert_eq!(w.row(9).unwrap(), &["PN011", "PROJ_F", "", "PN inconnu – insertion possible"]);
    // PN004 stored "0" in the master: duplicate line
    assert_eq!(
        w.row(10).unwrap(),
        &["PN004", "PROJ_B", "", "Doublon ou incertain – vérification manuelle requise"]
    );
    // Empty identifier: blanked format-error line
    assert_eq!(w.row(11).unwrap(), &["", "", "", "Erreur de format – à corriger manuellement"]);
    // In-place annotation of promoted rows
    assert_eq!(w.cell(1, 3), "Statut X remplacé par D");
    assert_eq!(w.cell(4, 3), "Statut X remplacé par D");
}

// -------------------------------------------------------------------------
// Idempotence boundary
// -------------------------------------------------------------------------

#[test]
fn rerun_on_mutated_reference_changes_outcome() {
    let working = incoming();
    let config = ReconConfig::default();
    let first = run(&config, &working, master()).unwrap();
    let second = run(&config, &working, first.reference.clone()).unwrap();

    assert_eq!(second.counts.deleted, 4);
    assert_eq!(second.counts.to_replace, 0);
    assert_eq!(second.reference, first.reference);
}

// -------------------------------------------------------------------------
// Project scoping
// -------------------------------------------------------------------------

#[test]
fn shared_identifier_across_projects() {
    let reference = table(
        &["PN", "Projet", "Statut"],
        &[&["PN004", "PROJ_A", "X"], &["PN004", "PROJ_B", "D"]],
    );
    let config = ReconConfig::default();
    let roles = RoleMap::resolve(&reference, &config.columns);

    assert_eq!(lookup(&reference, &roles, "PN004", None), Status::Duplicate);
    assert_eq!(lookup(&reference, &roles, "PN004", Some("PROJ_A")), Status::ToReplace);

    // Working table without a project column cannot disambiguate
    let working = table(&["PN"], &[&["PN004"]]);
    let result = run(&config, &working, reference.clone()).unwrap();
    assert_eq!(result.counts.duplicate, 1);

    let working = table(&["PN", "Project"], &[&["PN004", "PROJ_A"]]);
    let result = run(&config, &working, reference).unwrap();
    assert_eq!(result.counts.to_replace, 1);
    assert_eq!(result.reference.cell(0, 2), "D");
    assert_eq!(result.reference.cell(1, 2), "D");
}

// -------------------------------------------------------------------------
// Clean -> run -> commit
// -------------------------------------------------------------------------

#[test]
fn clean_then_run_then_commit() {
    let config = ReconConfig::default();
    let raw = table(
        &["Réf Composant", "Projet", "Quantité"],
        &[&[" PN-001 ", "PROJ_A", "1"], &["   ", "PROJ_A", "2"], &["PN/777", "PROJ_A", "3"]],
    );
    let cleaned = clean_table(&raw, &config, CleanOptions::default()).unwrap();
    assert_eq!(cleaned.dropped_empty, 1);

    let mut result = run(&config, &cleaned.table, master()).unwrap();
    assert_eq!(result.counts.deleted, 1);
    assert_eq!(result.counts.unknown, 1);

    let added = commit_additions(&mut result, &cleaned.table, &config).unwrap();
    assert_eq!(added, 1);
    let last = result.reference.len() - 1;
    assert_eq!(result.reference.cell(last, 0), "PN777");
    assert_eq!(result.reference.cell(last, 1), "PROJ_A");
    assert_eq!(result.reference.cell(last, 2), "A");
}

#[test]
fn custom_aliases_resolve_other_headers() {
    let config = ReconConfig::from_toml(
        r#"
[columns]
part_number = ["SKU"]
project = ["Line"]
status = ["Lifecycle"]
"#,
    )
    .unwrap();
    let reference = table(&["SKU", "Line", "Lifecycle"], &[&["AB12", "L1", "X"]]);
    let working = table(&["sku code", "line"], &[&["AB-12", "L1"]]);

    let result = run(&config, &working, reference).unwrap();
    assert_eq!(result.counts.to_replace, 1);
    assert_eq!(result.reference.cell(0, 2), "D");
}
