//! `bomsync run` and `bomsync lookup`.

use std::path::{Path, PathBuf};

use bomsync_io::table::TableFormat;
use bomsync_recon::clean::{clean_table, CleanOptions};
use bomsync_recon::column::{Role, RoleMap};
use bomsync_recon::commit::commit_additions;
use bomsync_recon::lookup::{lookup, matching_rows};
use bomsync_recon::model::ReconSummary;
use bomsync_recon::normalize::normalize;
use bomsync_recon::ReconResult;
use chrono::Local;
use serde::Serialize;

use crate::{load_config, read_table, CliError, OutputFormat};

const UPDATE_SHEET: &str = "Updated_BOM";
const MASTER_SHEET: &str = "Master_BOM";
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct RunArgs {
    pub working: PathBuf,
    pub master: PathBuf,
    pub config: Option<PathBuf>,
    pub sheet: Option<String>,
    pub master_sheet: Option<String>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub master_out: Option<PathBuf>,
    pub no_master_write: bool,
    pub commit_new: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RunOutput {
    summary: ReconSummary,
    committed_rows: usize,
    outputs: OutputPaths,
}

#[derive(Debug, Serialize)]
struct OutputPaths {
    update: PathBuf,
    report: Option<PathBuf>,
    master: Option<PathBuf>,
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    // A master that cannot be written back is refused before any output exists
    let master_path = master_target(&args)?;

    let config = load_config(args.config.as_deref())?;
    let raw = read_table(&args.working, args.sheet.as_deref())?;
    let reference = read_table(&args.master, args.master_sheet.as_deref())?;

    let cleaned = clean_table(&raw, &config, CleanOptions::default()).map_err(CliError::recon)?;
    if cleaned.dropped_empty > 0 {
        log::warn!(
            "{}: {} rows without a part number skipped",
            args.working.display(),
            cleaned.dropped_empty
        );
    }
    let working = cleaned.table;
    log::info!(
        "working: {} rows from {}, master: {} rows from {}",
        working.len(),
        args.working.display(),
        reference.len(),
        args.master.display()
    );

    let mut result = bomsync_recon::run(&config, &working, reference).map_err(CliError::recon)?;

    let committed_rows = if args.commit_new {
        commit_additions(&mut result, &working, &config).map_err(CliError::recon)?
    } else {
        0
    };

    std::fs::create_dir_all(&args.output_dir)
        .map_err(|e| CliError::persist(format!("cannot create {}: {}", args.output_dir.display(), e)))?;
    let stamp = Local::now().format(FILE_STAMP_FORMAT).to_string();

    let update = write_update(&result, &args.output_dir, &stamp, args.format, &config)?;
    let report = write_report(&result, &args.output_dir, &stamp, args.format)?;
    let master = write_master(&result, &args, master_path, committed_rows)?;

    let summary = result.summary();
    print_summary(&summary, committed_rows);
    eprintln!("wrote {}", update.display());
    if let Some(path) = &report {
        eprintln!("wrote {}", path.display());
    }
    if let Some(path) = &master {
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let output = RunOutput {
            summary,
            committed_rows,
            outputs: OutputPaths { update, report, master },
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::general(format!("JSON serialization error: {}", e)))?;
        println!("{}", json);
    }

    Ok(())
}

fn write_update(
    result: &ReconResult,
    dir: &Path,
    stamp: &str,
    format: OutputFormat,
    config: &bomsync_recon::ReconConfig,
) -> Result<PathBuf, CliError> {
    let path = dir.join(format!("Update_{}.{}", stamp, format.extension()));
    match format {
        OutputFormat::Xlsx => {
            let notes_col = RoleMap::resolve(&result.working, &config.columns).notes;
            let highlighted = bomsync_io::xlsx::export_highlighted(
                &result.working,
                &path,
                UPDATE_SHEET,
                notes_col,
                &config.comments,
            )
            .map_err(CliError::persist)?;
            log::debug!("{} rows highlighted", highlighted);
        }
        OutputFormat::Csv => {
            bomsync_io::csv::export(&result.working, &path).map_err(CliError::persist)?;
        }
    }
    Ok(path)
}

/// The report is skipped when nothing was actioned.
fn write_report(
    result: &ReconResult,
    dir: &Path,
    stamp: &str,
    format: OutputFormat,
) -> Result<Option<PathBuf>, CliError> {
    if result.changelog.is_empty() {
        log::warn!("no rows actioned, change report not written");
        return Ok(None);
    }

    let path = dir.join(format!("Rapport_Modifications_{}.{}", stamp, format.extension()));
    let written = match format {
        OutputFormat::Xlsx => bomsync_io::xlsx::export_report(&result.changelog, &path),
        OutputFormat::Csv => bomsync_io::csv::export(&result.changelog.to_table(), &path),
    };
    written.map_err(CliError::persist)?;
    Ok(Some(path))
}

/// Where the updated master goes, checked against the formats that can be
/// written. None with --no-master-write.
fn master_target(args: &RunArgs) -> Result<Option<PathBuf>, CliError> {
    if args.no_master_write {
        return Ok(None);
    }
    let target = args.master_out.clone().unwrap_or_else(|| args.master.clone());
    if let Err(e) = TableFormat::for_output(&target) {
        let err = CliError::usage(format!("cannot save the updated master: {}", e));
        return Err(match args.master_out {
            Some(_) => err,
            None => err.with_hint(format!(
                "pass --master-out {} to save a copy, or --no-master-write",
                target.with_extension("xlsx").display()
            )),
        });
    }
    Ok(Some(target))
}

/// Save the reference with its promotions (and committed rows). An unchanged
/// master is only rewritten when --master-out asks for a copy.
///
/// An Excel master keeps its sheet name and its other sheets.
fn write_master(
    result: &ReconResult,
    args: &RunArgs,
    target: Option<PathBuf>,
    committed_rows: usize,
) -> Result<Option<PathBuf>, CliError> {
    let Some(target) = target else {
        return Ok(None);
    };
    let changed = result.meta.promoted_rows > 0 || committed_rows > 0;
    if args.master_out.is_none() && !changed {
        log::info!("master unchanged, not rewritten");
        return Ok(None);
    }

    let master_is_excel = matches!(TableFormat::from_path(&args.master), Ok(TableFormat::Excel));
    let target_is_excel = matches!(TableFormat::from_path(&target), Ok(TableFormat::Excel));
    if master_is_excel && target_is_excel {
        let sheet = bomsync_io::xlsx::export_replacing_sheet(
            &result.reference,
            &args.master,
            &target,
            args.master_sheet.as_deref(),
        )
        .map_err(CliError::persist)?;
        log::debug!("master written back to sheet '{}'", sheet);
    } else {
        bomsync_io::export(&result.reference, &target, MASTER_SHEET).map_err(CliError::persist)?;
    }
    Ok(Some(target))
}

fn print_summary(summary: &ReconSummary, committed_rows: usize) {
    let c = &summary.counts;
    let mut line = format!(
        "reconciled {} rows: D {}, X {}, 0 {}, NaN {}",
        summary.meta.working_rows, c.deleted, c.to_replace, c.duplicate, c.unknown
    );
    if c.unrecognized > 0 {
        line.push_str(&format!(", other {}", c.unrecognized));
    }
    eprintln!("{}", line);
    eprintln!(
        "{} actions logged: {} master rows promoted, {} rows added to the update",
        summary.actions.values().sum::<usize>(),
        summary.meta.promoted_rows,
        summary.meta.synthesized_rows,
    );
    if committed_rows > 0 {
        eprintln!("{} new part numbers committed to the master", committed_rows);
    }
}

// ============================================================================
// lookup
// ============================================================================

#[derive(Debug, Serialize)]
struct LookupOutput {
    part_number: String,
    project: Option<String>,
    status: String,
    matches: usize,
}

pub fn cmd_lookup(
    part: String,
    master: PathBuf,
    project: Option<String>,
    config: Option<PathBuf>,
    sheet: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let part_number = normalize(&part);
    if part_number.is_empty() {
        return Err(CliError::usage(format!("'{}' has no letters or digits", part))
            .with_hint("part numbers keep only ASCII letters and digits"));
    }

    let config = load_config(config.as_deref())?;
    let reference = read_table(&master, sheet.as_deref())?;
    let roles = RoleMap::resolve(&reference, &config.columns);
    roles.require(Role::PartNumber, "reference").map_err(CliError::recon)?;

    let project = project.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    let status = lookup(&reference, &roles, &part_number, project.as_deref());
    let matches = matching_rows(&reference, &roles, &part_number, project.as_deref()).len();
    log::debug!("lookup '{}': {} candidate rows", part_number, matches);

    if json {
        let output = LookupOutput {
            part_number,
            project,
            status: status.as_token().to_string(),
            matches,
        };
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::general(format!("JSON serialization error: {}", e)))?;
        println!("{}", text);
    } else {
        println!("{}", status);
    }

    Ok(())
}
