use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid swift code '{0}': expected 8 to 11 letters or digits")]
    InvalidSwiftCode(String),

    #[error("invalid country code '{0}': expected ISO-3166 alpha-2")]
    InvalidCountryCode(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("swift code {0} not found")]
    NotFound(String),

    #[error("swift code {0} already exists")]
    DuplicateKey(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: connection lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] RecordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unable to read {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("not enough rows: found {rows}, need a header and at least one data row")]
    InsufficientData { rows: usize },

    #[error("invalid record at row {row}: {source}")]
    InvalidRecord {
        row: usize,
        #[source]
        source: RecordError,
    },

    #[error("failed to insert data at row {row}: {source}")]
    Insert {
        row: usize,
        #[source]
        source: StoreError,
    },
}
