//! `bomsync clean`

use std::path::PathBuf;

use bomsync_recon::clean::{clean_table, CleanOptions};

use crate::{load_config, read_table, CliError};

const CLEAN_SHEET: &str = "BOM";

pub fn cmd_clean(
    input: PathBuf,
    output: PathBuf,
    dedupe: bool,
    config: Option<PathBuf>,
    sheet: Option<String>,
) -> Result<(), CliError> {
    // Format errors surface before any reading
    bomsync_io::table::TableFormat::for_output(&output).map_err(CliError::usage)?;

    let config = load_config(config.as_deref())?;
    let table = read_table(&input, sheet.as_deref())?;

    let options = CleanOptions { dedupe_part_numbers: dedupe };
    let report = clean_table(&table, &config, options).map_err(CliError::recon)?;

    bomsync_io::export(&report.table, &output, CLEAN_SHEET).map_err(CliError::persist)?;

    eprintln!(
        "cleaned {}: {} rows kept of {} ({} without part number, {} duplicates)",
        input.display(),
        report.table.len(),
        report.original_rows,
        report.dropped_empty,
        report.dropped_duplicates,
    );
    eprintln!("wrote {}", output.display());
    Ok(())
}
