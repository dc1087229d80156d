// CSV/TSV import/export of BOM tables

use std::io::Read;
use std::path::Path;

use bomsync_recon::Table;

/// Import a delimited file. The first record is the header row.
pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    parse(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    parse(&content, delimiter)
}

/// Pick the delimiter giving the most consistent field count over the first
/// lines. Candidates: tab, semicolon (French Excel exports), comma, pipe.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(10).collect();
    let mut best = b',';
    let mut best_score = 0usize;

    for delim in [b'\t', b';', b',', b'|'] {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&width) = counts.first() else {
            continue;
        };
        if width <= 1 {
            continue;
        }
        let score = counts.iter().filter(|&&c| c == width).count() * width;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read a file as UTF-8, falling back to Windows-1252 (Excel CSV exports).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

fn parse(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        let mut cells: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        // Trailing empty fields beyond the header are noise from spreadsheet exports
        while cells.len() > table.width() && cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        table
            .push_row(cells)
            .map_err(|e| format!("line {}: {e}", idx + 2))?;
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b'\t')
}

fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    writer.write_record(table.headers()).map_err(|e| e.to_string())?;
    for row in table.rows() {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
