//! Errors surfaced to clients as `{"error": ...}` bodies

use thiserror::Error;

use crate::storage::FilesystemError;

/// Errors that can occur while resolving or executing a command
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("unknown command")]
    UnknownCommand(String),

    #[error("command disabled: {0}")]
    CommandDisabled(String),

    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Also covers malformed handles and handles that escape their volume,
    /// so clients learn nothing about what lies outside a root.
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("directory is not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("unable to find a free name for {0}")]
    NameExhausted(String),

    #[error("file is not valid UTF-8 text: {0}")]
    NotText(String),

    #[error("unable to read image: {0}")]
    Image(String),

    #[error("cannot copy {0} into itself")]
    InvalidCopy(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}
