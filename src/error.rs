//! Error taxonomy.
//!
//! Only loading can fail. Everything downstream of a loaded [`crate::TermStore`]
//! degrades to an empty or blank result instead; the [`Miss`] values below
//! describe those degradations for logging and are never returned as `Err`.
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::TableId;

/// Fatal startup failure: a required file is missing, unreadable or lacks a
/// required column, or the configuration is invalid.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("cannot parse JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Non-fatal lookup outcomes, resolved to an empty result and logged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Miss {
    /// Unknown term or date.
    LookupMiss { key: String },
    /// Selected row index beyond the table snapshot (stale after a re-sort).
    StaleSelectionIndex { table: TableId, index: usize, len: usize },
}

impl std::fmt::Display for Miss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Miss::LookupMiss { key } => write!(f, "no records for {key}"),
            Miss::StaleSelectionIndex { table, index, len } => {
                write!(f, "stale row index {index} for {table} ({len} rows)")
            }
        }
    }
}
