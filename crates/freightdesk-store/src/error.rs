use freightdesk_core::{CallId, CoreError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("referenced call does not exist: {0}")]
    MissingCall(CallId),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
    #[error("failed to read catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    Core,
    MissingHomeDir,
    NotFound,
    MissingCall,
    Migration,
    InvalidDataPath,
    Catalog,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::MissingCall(_) => StoreErrorKind::MissingCall,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
            StoreError::Catalog { .. } => StoreErrorKind::Catalog,
        }
    }

    /// Client-caused failures: missing fields or a dangling call reference.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            StoreErrorKind::Core | StoreErrorKind::MissingCall
        )
    }

    /// Field names to report back with a validation failure.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            StoreError::Core(err) => err.fields(),
            StoreError::MissingCall(_) => vec!["call_id"],
            _ => Vec::new(),
        }
    }
}
