use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::changelog::ChangeLog;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A rectangular table of string cells.
///
/// Every row holds exactly `headers.len()` cells. Row order is significant:
/// indices into `rows` are the line numbers reported in the change log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Build a table from raw rows. Short rows are padded with empty cells;
    /// rows wider than the header are rejected.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ReconError> {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// Cell text, or "" when the coordinates are out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Overwrite a cell. Returns false when the coordinates are out of range.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    /// Append a row, padding it to the table width. Returns its index.
    pub fn push_row(&mut self, mut row: Vec<String>) -> Result<usize, ReconError> {
        if row.len() > self.headers.len() {
            return Err(ReconError::RaggedRow {
                row: self.rows.len(),
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    /// Append a row of empty cells. Returns its index.
    pub fn push_blank_row(&mut self) -> usize {
        self.rows.push(vec![String::new(); self.headers.len()]);
        self.rows.len() - 1
    }

    /// Append a column, filling existing rows with empty cells. Returns its index.
    pub fn add_column(&mut self, name: impl Into<String>) -> usize {
        self.headers.push(name.into());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Position of the header that equals `name` exactly.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// New table containing only `columns`, in that order.
    pub fn select_columns(&self, columns: &[usize]) -> Table {
        let headers = columns
            .iter()
            .map(|&c| self.headers.get(c).cloned().unwrap_or_default())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|r| columns.iter().map(|&c| r.get(c).cloned().unwrap_or_default()).collect())
            .collect();
        Table { headers, rows }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
        &mut self.rows
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Reconciliation status of a part identifier.
///
/// The legacy tokens `"D"`, `"X"`, `"0"` and `"NaN"` only exist at the table
/// boundary. `"NaN"` is a status value, not a missing value: a blank status
/// cell also maps to `Unknown`, but never the other way round.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// `D`: already deleted, nothing to do.
    Deleted,
    /// `X`: to be promoted to `D`.
    ToReplace,
    /// `0`: ambiguous match.
    Duplicate,
    /// `NaN`: no match, blank status or malformed identifier.
    Unknown,
    /// Any other status text found in the reference, kept verbatim.
    Unrecognized(String),
}

impl Status {
    pub const DELETED: &'static str = "D";
    pub const TO_REPLACE: &'static str = "X";
    pub const DUPLICATE: &'static str = "0";
    pub const UNKNOWN: &'static str = "NaN";

    /// Parse a status cell. Blank cells are `Unknown`.
    pub fn parse(token: &str) -> Status {
        match token.trim() {
            "" | Self::UNKNOWN => Status::Unknown,
            Self::DELETED => Status::Deleted,
            Self::TO_REPLACE => Status::ToReplace,
            Self::DUPLICATE => Status::Duplicate,
            other => Status::Unrecognized(other.to_string()),
        }
    }

    pub fn as_token(&self) -> &str {
        match self {
            Status::Deleted => Self::DELETED,
            Status::ToReplace => Self::TO_REPLACE,
            Status::Duplicate => Self::DUPLICATE,
            Status::Unknown => Self::UNKNOWN,
            Status::Unrecognized(s) => s,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_token())
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoAction,
    UpdateToDeleted,
    AddNewLine,
    AddNewLineError,
    ManualReview,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::NoAction => "no_action",
            Action::UpdateToDeleted => "update_to_deleted",
            Action::AddNewLine => "add_new_line",
            Action::AddNewLineError => "add_new_line_error",
            Action::ManualReview => "manual_review",
        }
    }

    /// Whether this action appends a synthesized row to the working table.
    pub fn synthesizes_row(&self) -> bool {
        matches!(self, Action::AddNewLine | Action::AddNewLineError)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Change log entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeLogEntry {
    /// 0-based index of the actioned row in the output working table.
    pub line_index: usize,
    /// 0-based index of the working row that triggered the action.
    pub source_index: usize,
    pub part_identifier: String,
    pub project: String,
    pub status: Status,
    pub action: Action,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    #[serde(rename = "D")]
    pub deleted: usize,
    #[serde(rename = "X")]
    pub to_replace: usize,
    #[serde(rename = "0")]
    pub duplicate: usize,
    #[serde(rename = "NaN")]
    pub unknown: usize,
    #[serde(rename = "other")]
    pub unrecognized: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: &Status) {
        match status {
            Status::Deleted => self.deleted += 1,
            Status::ToReplace => self.to_replace += 1,
            Status::Duplicate => self.duplicate += 1,
            Status::Unknown => self.unknown += 1,
            Status::Unrecognized(_) => self.unrecognized += 1,
        }
    }

    pub fn get(&self, status: &Status) -> usize {
        match status {
            Status::Deleted => self.deleted,
            Status::ToReplace => self.to_replace,
            Status::Duplicate => self.duplicate,
            Status::Unknown => self.unknown,
            Status::Unrecognized(_) => self.unrecognized,
        }
    }

    pub fn total(&self) -> usize {
        self.deleted + self.to_replace + self.duplicate + self.unknown + self.unrecognized
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub working_rows: usize,
    pub reference_rows: usize,
    pub synthesized_rows: usize,
    pub promoted_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    /// Reference table with status promotions applied.
    pub reference: Table,
    /// Working table copy: original rows followed by synthesized rows.
    pub working: Table,
    /// Derived status of every working row.
    pub counts: StatusCounts,
    pub changelog: ChangeLog,
}

/// Compact view of a run for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub meta: ReconMeta,
    pub counts: StatusCounts,
    pub logged: StatusCounts,
    pub actions: BTreeMap<String, usize>,
}

impl ReconResult {
    pub fn summary(&self) -> ReconSummary {
        let mut actions = BTreeMap::new();
        for entry in self.changelog.entries() {
            *actions.entry(entry.action.as_str().to_string()).or_insert(0) += 1;
        }
        ReconSummary {
            meta: self.meta.clone(),
            counts: self.counts,
            logged: self.changelog.summarize(),
            actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn status_tokens() {
        assert_eq!(Status::parse("D"), Status::Deleted);
        assert_eq!(Status::parse(" X "), Status::ToReplace);
        assert_eq!(Status::parse("0"), Status::Duplicate);
        assert_eq!(Status::parse("NaN"), Status::Unknown);
        assert_eq!(Status::parse(""), Status::Unknown);
        assert_eq!(Status::parse("A"), Status::Unrecognized("A".into()));
        // Case matters: "nan" is not the legacy token
        assert_eq!(Status::parse("nan"), Status::Unrecognized("nan".into()));
        assert_eq!(Status::Unknown.as_token(), "NaN");
        assert_eq!(Status::Unrecognized("Z".into()).to_string(), "Z");
    }

    #[test]
    fn status_serializes_as_token() {
        let json = serde_json::to_string(&vec![Status::Duplicate, Status::Unknown]).unwrap();
        assert_eq!(json, r#"["0","NaN"]"#);
    }

    #[test]
    fn counts_serialize_with_legacy_keys() {
        let mut counts = StatusCounts::default();
        counts.record(&Status::Deleted);
        counts.record(&Status::Unknown);
        counts.record(&Status::Unknown);
        let v = serde_json::to_value(counts).unwrap();
        assert_eq!(v["D"], 1);
        assert_eq!(v["NaN"], 2);
        assert_eq!(v["0"], 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn short_rows_are_padded() {
        let t = Table::from_rows(strings(&["a", "b", "c"]), vec![strings(&["1"])]).unwrap();
        assert_eq!(t.row(0).unwrap(), &["1".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn wide_rows_are_rejected() {
        let err = Table::from_rows(strings(&["a"]), vec![strings(&["1", "2"])]).unwrap_err();
        assert_eq!(err, ReconError::RaggedRow { row: 0, expected: 1, found: 2 });
    }

    #[test]
    fn add_column_extends_rows() {
        let mut t = Table::from_rows(strings(&["a"]), vec![strings(&["1"]), strings(&["2"])]).unwrap();
        let idx = t.add_column("Notes");
        assert_eq!(idx, 1);
        assert_eq!(t.cell(1, 1), "");
        assert!(t.set_cell(1, 1, "hello"));
        assert_eq!(t.cell(1, 1), "hello");
        assert!(!t.set_cell(5, 0, "x"));
    }
}
