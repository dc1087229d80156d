use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty alias list, bad threshold, etc.).
    ConfigValidation(String),
    /// A required column role could not be resolved in a table.
    MissingColumn { table: String, role: String },
    /// A row has more cells than the table has headers.
    RaggedRow { row: usize, expected: usize, found: usize },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, role } => {
                write!(f, "{table} table: no column matches role '{role}'")
            }
            Self::RaggedRow { row, expected, found } => {
                write!(f, "row {row}: expected at most {expected} cells, found {found}")
            }
        }
    }
}

impl std::error::Error for ReconError {}
