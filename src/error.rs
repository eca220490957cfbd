use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("Could not access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse JSON '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset '{}' contains no records", path.display())]
    EmptyDataset { path: PathBuf },

    #[error("Record index {index} is out of range (dataset has {len} records)")]
    OutOfRange { index: usize, len: usize },

    #[error("Could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AnnotatorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
