// Format dispatch on file extension

use std::path::Path;

use bomsync_recon::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Excel,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<TableFormat, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(TableFormat::Csv),
            "tsv" | "tab" => Ok(TableFormat::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(TableFormat::Excel),
            "" => Err(format!("{}: no file extension, cannot infer format", path.display())),
            other => Err(format!("{}: unsupported format '.{}'", path.display(), other)),
        }
    }

    /// Format for a file `export` may write. Excel output is always xlsx
    /// bytes, so legacy workbook extensions are read-only.
    pub fn for_output(path: &Path) -> Result<TableFormat, String> {
        let format = TableFormat::from_path(path)?;
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if format == TableFormat::Excel && !is_xlsx {
            return Err(format!("{}: cannot write this workbook format, only .xlsx", path.display()));
        }
        Ok(format)
    }
}

/// Import a table from any supported file. `sheet` only applies to Excel.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => crate::csv::import(path),
        TableFormat::Tsv => crate::csv::import_with_delimiter(path, b'\t'),
        TableFormat::Excel => crate::xlsx::import(path, sheet),
    }
}

/// Export a table to a csv, tsv or xlsx file.
pub fn export(table: &Table, path: &Path, sheet_name: &str) -> Result<(), String> {
    match TableFormat::for_output(path)? {
        TableFormat::Csv => crate::csv::export(table, path),
        TableFormat::Tsv => crate::csv::export_tsv(table, path),
        TableFormat::Excel => crate::xlsx::export(table, path, sheet_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("a.CSV")).unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("a.tsv")).unwrap(), TableFormat::Tsv);
        assert_eq!(TableFormat::from_path(Path::new("Master BOM.xlsx")).unwrap(), TableFormat::Excel);
        assert_eq!(TableFormat::from_path(Path::new("old.xls")).unwrap(), TableFormat::Excel);
        assert!(TableFormat::from_path(Path::new("a.pdf")).unwrap_err().contains("unsupported"));
        assert!(TableFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_legacy_workbooks_are_read_only() {
        assert_eq!(TableFormat::for_output(Path::new("m.XLSX")).unwrap(), TableFormat::Excel);
        assert_eq!(TableFormat::for_output(Path::new("m.tsv")).unwrap(), TableFormat::Tsv);
        for name in ["m.xls", "m.xlsb", "m.ods", "m.xlsm"] {
            assert!(TableFormat::for_output(Path::new(name)).is_err(), "{name}");
        }
    }

    #[test]
    fn test_export_refuses_legacy_extension() {
        let dir = tempdir().unwrap();
        let table = Table::from_rows(vec!["PN".into()], vec![vec!["PN001".into()]]).unwrap();
        for name in ["master.xls", "master.ods", "master.xlsb"] {
            let path = dir.path().join(name);
            let err = export(&table, &path, "Master_BOM").unwrap_err();
            assert!(err.contains(".xlsx"), "{err}");
            assert!(!path.exists(), "{name} was written");
        }
    }

    #[test]
    fn test_csv_to_xlsx_conversion() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("in.csv");
        let xlsx_path = dir.path().join("out.xlsx");
        std::fs::write(&csv_path, "Part Number;Projet\nPN001;PROJ_A\n").unwrap();

        let table = import(&csv_path, None).unwrap();
        export(&table, &xlsx_path, "BOM").unwrap();
        assert_eq!(import(&xlsx_path, Some("BOM")).unwrap(), table);
    }
}
