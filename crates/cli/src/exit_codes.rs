//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad args, missing input file)                |
//! | 3    | Configuration file unreadable, malformed or invalid       |
//! | 4    | Reconciliation precondition failed (missing column, ...)  |
//! | 5    | Persistence failure (import/export of a table or report)  |
//!
//! A run that completes is a success even when rows were flagged for
//! manual review: flagged rows are data, not errors.

use bomsync_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

/// Config file could not be read, parsed, or failed validation.
pub const EXIT_CONFIG: u8 = 3;

/// The engine refused the input before mutating anything.
pub const EXIT_RECON: u8 = 4;

/// Reading or writing a table, workbook, or report failed.
pub const EXIT_PERSIST: u8 = 5;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::MissingColumn { .. } | ReconError::RaggedRow { .. } => EXIT_RECON,
    }
}
