//! Audit trail of actioned rows.

use serde::Serialize;

use crate::model::{ChangeLogEntry, Status, StatusCounts, Table};

/// Headers of the exported change-log table.
pub const CHANGELOG_HEADERS: [&str; 7] =
    ["Ligne", "Part Number", "Projet", "Statut", "Action", "Détail", "Timestamp"];

/// Headers of the exported counts table.
pub const COUNTS_HEADERS: [&str; 2] = ["Statut", "Nombre"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One entry per row that received an action other than `no_action`, in the
/// order the actions were taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<ChangeLogEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: ChangeLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Status counts over the logged entries only.
    ///
    /// Rows that needed no action are never logged, so `D` is normally 0
    /// here even when the run saw deleted parts.
    pub fn summarize(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in &self.entries {
            counts.record(&entry.status);
        }
        counts
    }

    /// Entries as a table. `Ligne` is 1-based.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(CHANGELOG_HEADERS.iter().map(|h| h.to_string()).collect());
        for e in &self.entries {
            table.rows_mut().push(vec![
                (e.line_index + 1).to_string(),
                e.part_identifier.clone(),
                e.project.clone(),
                e.status.as_token().to_string(),
                e.action.as_str().to_string(),
                e.detail.clone(),
                e.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ]);
        }
        table
    }

    /// `summarize()` as a two-column table. The `Autre` row only appears when
    /// out-of-domain statuses were logged.
    pub fn counts_table(&self) -> Table {
        let counts = self.summarize();
        let mut table = Table::new(COUNTS_HEADERS.iter().map(|h| h.to_string()).collect());
        for status in [Status::Deleted, Status::ToReplace, Status::Duplicate, Status::Unknown] {
            table
                .rows_mut()
                .push(vec![status.as_token().to_string(), counts.get(&status).to_string()]);
        }
        if counts.unrecognized > 0 {
            table.rows_mut().push(vec!["Autre".into(), counts.unrecognized.to_string()]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Action;
    use chrono::{TimeZone, Utc};

    fn entry(line: usize, pn: &str, status: Status, action: Action) -> ChangeLogEntry {
        ChangeLogEntry {
            line_index: line,
            source_index: line,
            part_identifier: pn.into(),
            project: "PROJ_A".into(),
            status,
            action,
            detail: String::new(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn summarize_counts_entries_only() {
        let mut log = ChangeLog::new();
        log.record(entry(1, "PN002", Status::ToReplace, Action::UpdateToDeleted));
        log.record(entry(3, "PN999", Status::Unknown, Action::AddNewLineError));
        log.record(entry(4, "PN998", Status::Unknown, Action::AddNewLineError));
        log.record(entry(2, "PN010", Status::Unrecognized("A".into()), Action::ManualReview));

        let counts = log.summarize();
        assert_eq!(counts.deleted, 0);
        assert_eq!(counts.to_replace, 1);
        assert_eq!(counts.duplicate, 0);
        assert_eq!(counts.unknown, 2);
        assert_eq!(counts.unrecognized, 1);
    }

    #[test]
    fn export_tables() {
        let mut log = ChangeLog::new();
        log.record(entry(3, "PN999", Status::Unknown, Action::AddNewLineError));

        let t = log.to_table();
        assert_eq!(t.headers()[0], "Ligne");
        assert_eq!(t.len(), 1);
        assert_eq!(t.cell(0, 0), "4");
        assert_eq!(t.cell(0, 3), "NaN");
        assert_eq!(t.cell(0, 4), "add_new_line_error");
        assert_eq!(t.cell(0, 6), "2026-01-15 09:30:00");

        let c = log.counts_table();
        assert_eq!(c.len(), 4);
        assert_eq!(c.cell(3, 0), "NaN");
        assert_eq!(c.cell(3, 1), "1");
    }

    #[test]
    fn counts_table_lists_other_when_present() {
        let mut log = ChangeLog::new();
        log.record(entry(0, "PN010", Status::Unrecognized("A".into()), Action::ManualReview));
        let c = log.counts_table();
        assert_eq!(c.len(), 5);
        assert_eq!(c.cell(4, 0), "Autre");
        assert_eq!(c.cell(4, 1), "1");
    }
}
