// Excel import (xlsx, xls, xlsb, ods) and export of BOM tables and reports

use std::path::Path;

use bomsync_recon::config::CommentConfig;
use bomsync_recon::{ChangeLog, Table};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet};

pub const REPORT_CHANGES_SHEET: &str = "Modifications";
pub const REPORT_STATS_SHEET: &str = "Statistiques";

/// Row fill applied to actioned working rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Duplicate or ambiguous part number
    Duplicate,
    /// Format error or part number absent from the reference
    Attention,
    /// X status promoted to D
    Replaced,
}

impl Highlight {
    pub fn color(&self) -> Color {
        match self {
            Highlight::Duplicate => Color::RGB(0xFFCCCC),
            Highlight::Attention => Color::RGB(0xFFE6CC),
            Highlight::Replaced => Color::RGB(0xFFFFCC),
        }
    }

    /// Map a notes cell back to the fill it calls for. Notes that carry one
    /// of the configured comments among other text still match.
    pub fn for_comment(notes: &str, comments: &CommentConfig) -> Option<Highlight> {
        let notes = notes.trim();
        if notes.is_empty() {
            return None;
        }
        let has = |marker: &str| !marker.trim().is_empty() && notes.contains(marker.trim());
        if has(&comments.duplicate) {
            Some(Highlight::Duplicate)
        } else if has(&comments.format_error) || has(&comments.not_found) {
            Some(Highlight::Attention)
        } else if has(&comments.to_replace) {
            Some(Highlight::Replaced)
        } else {
            None
        }
    }
}

// ----------------------------------------------------------------------------
// Import
// ----------------------------------------------------------------------------

/// Import one sheet (the first when `sheet` is None). The first row holds
/// the headers.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| format!("Sheet '{}' not found (available: {})", wanted, sheet_names.join(", ")))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", name, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Ok(Table::new(Vec::new())),
    };

    // calamine pads ranges to the widest row; trailing unnamed columns are dropped
    let width = headers.iter().rposition(|h| !h.is_empty()).map_or(0, |i| i + 1);
    let mut table = Table::new(headers[..width].to_vec());

    for (idx, row) in rows.enumerate() {
        let cells: Vec<String> = row.iter().take(width).map(cell_text).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        table
            .push_row(cells)
            .map_err(|e| format!("sheet '{}' row {}: {}", name, idx + 2, e))?;
    }

    log::debug!("imported {} rows from {} [{}]", table.len(), path.display(), name);
    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integers without decimals so "10" does not come back as "10.0"
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => serial_to_text(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Render an Excel serial date (1900 system) as ISO text.
fn serial_to_text(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return format!("{}", serial);
    };
    let seconds = (serial * 86_400.0).round() as i64;
    let dt = epoch + Duration::seconds(seconds);
    if seconds % 86_400 == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// ----------------------------------------------------------------------------
// Export
// ----------------------------------------------------------------------------

/// Write a table as a single plain sheet.
pub fn export(table: &Table, path: &Path, sheet_name: &str) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;
    write_table(worksheet, table, |_| None)?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))
}

/// Write `table` in place of one sheet of the `source` workbook (the first
/// when `sheet` is None) and save the result as xlsx at `path`. The other
/// sheets keep their order and cell values; formatting is not carried over.
///
/// `source` and `path` may be the same file: every sheet is read before
/// anything is written.
pub fn export_replacing_sheet(
    table: &Table,
    source: &Path,
    path: &Path,
    sheet: Option<&str>,
) -> Result<String, String> {
    let mut workbook_in =
        open_workbook_auto(source).map_err(|e| format!("Failed to open Excel file: {}", e))?;
    let names: Vec<String> = workbook_in.sheet_names().to_vec();
    let target = match sheet {
        Some(wanted) => wanted.to_string(),
        None => names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let mut sheets: Vec<(String, Option<Range<Data>>)> = Vec::with_capacity(names.len());
    for name in names {
        if name == target {
            sheets.push((name, None));
            continue;
        }
        let range = workbook_in
            .worksheet_range(&name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", name, e))?;
        sheets.push((name, Some(range)));
    }
    drop(workbook_in);
    if !sheets.iter().any(|(name, _)| *name == target) {
        sheets.push((target.clone(), None));
    }

    let mut workbook = XlsxWorkbook::new();
    for (name, range) in &sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;
        match range {
            Some(range) => write_range(worksheet, range)?,
            None => write_table(worksheet, table, |_| None)?,
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    log::debug!("wrote {} sheets to {}, replaced '{}'", sheets.len(), path.display(), target);
    Ok(target)
}

/// Write the updated working table, filling each actioned row with the colour
/// its notes comment calls for. Returns the number of highlighted rows.
pub fn export_highlighted(
    table: &Table,
    path: &Path,
    sheet_name: &str,
    notes_col: Option<usize>,
    comments: &CommentConfig,
) -> Result<usize, String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    let mut highlighted = 0;
    write_table(worksheet, table, |row| {
        let col = notes_col?;
        let fill = Highlight::for_comment(table.cell(row, col), comments);
        if fill.is_some() {
            highlighted += 1;
        }
        fill
    })?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(highlighted)
}

/// Write the change log and the per-status statistics as a two-sheet report.
pub fn export_report(changelog: &ChangeLog, path: &Path) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();

    let changes = workbook
        .add_worksheet()
        .set_name(REPORT_CHANGES_SHEET)
        .map_err(|e| format!("Failed to create sheet '{}': {}", REPORT_CHANGES_SHEET, e))?;
    write_table(changes, &changelog.to_table(), |_| None)?;

    let stats = workbook
        .add_worksheet()
        .set_name(REPORT_STATS_SHEET)
        .map_err(|e| format!("Failed to create sheet '{}': {}", REPORT_STATS_SHEET, e))?;
    write_table(stats, &changelog.counts_table(), |_| None)?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save report: {}", e))
}

/// Copy the values of a sheet read by calamine, keeping its cell positions.
fn write_range(worksheet: &mut Worksheet, range: &Range<Data>) -> Result<(), String> {
    let (row0, col0) = range.start().unwrap_or((0, 0));
    for (row, col, cell) in range.used_cells() {
        let r = row0 + row as u32;
        let c = (col0 as usize + col) as u16;
        let written = match cell {
            Data::Empty => continue,
            Data::Float(n) => worksheet.write_number(r, c, *n).map(|_| ()),
            Data::Int(n) => worksheet.write_number(r, c, *n as f64).map(|_| ()),
            Data::Bool(b) => worksheet.write_boolean(r, c, *b).map(|_| ()),
            other => worksheet.write_string(r, c, cell_text(other)).map(|_| ()),
        };
        written.map_err(|e| format!("Failed to write cell ({}, {}): {}", r, c, e))?;
    }
    Ok(())
}

fn write_table<F>(worksheet: &mut Worksheet, table: &Table, mut fill_for: F) -> Result<(), String>
where
    F: FnMut(usize) -> Option<Highlight>,
{
    let header_format = Format::new().set_bold();
    for (col, header) in table.headers().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", header, e))?;
    }

    for (row, cells) in table.rows().iter().enumerate() {
        let target_row = (row + 1) as u32;
        match fill_for(row) {
            Some(fill) => {
                let format = Format::new().set_background_color(fill.color());
                for (col, value) in cells.iter().enumerate() {
                    worksheet
                        .write_string_with_format(target_row, col as u16, value, &format)
                        .map_err(|e| format!("Failed to write row {}: {}", row + 1, e))?;
                }
            }
            None => {
                for (col, value) in cells.iter().enumerate() {
                    if value.is_empty() {
                        continue;
                    }
                    worksheet
                        .write_string(target_row, col as u16, value)
                        .map_err(|e| format!("Failed to write row {}: {}", row + 1, e))?;
                }
            }
        }
    }

    Ok(())
}
