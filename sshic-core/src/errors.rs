use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SshicError {
    #[error("Missing input file: {0}")]
    MissingInput(PathBuf),

    #[error("No fragment on {chr} contains the midpoint ({midpoint}) of probe {probe}")]
    NoContainingFragment {
        probe: String,
        chr: String,
        midpoint: i64,
    },

    #[error("Column '{column}' not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Error parsing {table}, line {line}: {message}")]
    Parse {
        table: String,
        line: usize,
        message: String,
    },

    #[error("Contact list references unknown fragment id {0}")]
    UnknownFragment(u32),

    #[error("Unknown probe: {0}")]
    UnknownProbe(String),

    #[error("No capture efficiency against reference '{0}' in the statistics table")]
    UnknownReference(String),

    #[error("Bin size must be a strictly positive number of base pairs")]
    InvalidBinSize,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SshicError>;
