// File I/O for BOM tables: CSV/TSV and Excel import/export.
// The reconciliation engine never touches files; everything here is the
// persistence side of a run.

pub mod csv;
pub mod table;
pub mod xlsx;

pub use table::{export, import};
