use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed similarity table {path:?} (line {line}): {reason}")]
    MalformedTable {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Malformed evidence table {path:?}: {reason}")]
    MalformedEvidence { path: PathBuf, reason: String },

    #[error("No evidence found in {root:?} for categories: {categories}")]
    NoEvidenceFound { root: PathBuf, categories: String },

    #[error("Evidence group {group:?} has no evidence rows")]
    EmptyEvidenceGroup { group: PathBuf },

    #[error("Selection policy '{0}' is not implemented")]
    PolicyNotImplemented(String),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
