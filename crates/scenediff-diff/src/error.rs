//! Error types for the diff crate.

/// Errors that can occur while configuring the diff engine.
///
/// Diffing itself never fails; only loading configuration can.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The configuration text is not valid TOML for [`DiffConfig`](crate::DiffConfig).
    #[error("invalid diff configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
