use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid file id: {0}")]
    InvalidFileId(String),

    #[error("invalid type code: {0}")]
    InvalidTypeCode(String),
}
