//! Storage backend trait for volume browsing

use std::path::{Path, PathBuf};

use super::entry::EntryMetadata;
use thiserror::Error;

/// Errors that can occur during filesystem operations
#[derive(Debug, Error)]
pub enum FilesystemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Path is outside of volume: {0}")]
    OutOfScope(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),
}

impl FilesystemError {
    /// Rewrite the path carried by path-bearing variants
    pub fn map_paths(self, f: impl Fn(&str) -> String) -> Self {
        match self {
            Self::NotADirectory(p) => Self::NotADirectory(f(&p)),
            Self::IsADirectory(p) => Self::IsADirectory(f(&p)),
            Self::NotFound(p) => Self::NotFound(f(&p)),
            Self::AlreadyExists(p) => Self::AlreadyExists(f(&p)),
            Self::OutOfScope(p) => Self::OutOfScope(f(&p)),
            other => other,
        }
    }
}

/// Abstraction over storage backends a volume can be rooted in.
///
/// All paths are absolute, backend-native paths. Scoping is the volume's job;
/// a backend operates on whatever path it is handed.
pub trait Filesystem: Send + Sync {
    /// Metadata for `path`, or `None` when nothing exists there
    fn metadata(&self, path: &Path) -> Result<Option<EntryMetadata>, FilesystemError>;

    /// Whether the current process can read `path` (list it, for directories)
    fn is_readable(&self, path: &Path) -> bool;

    /// List the paths of the immediate children of a directory, sorted by name
    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>, FilesystemError>;

    /// Read entire file contents
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FilesystemError>;

    /// Replace file contents, creating the file if needed
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FilesystemError>;

    /// Create a new empty file; fails if anything exists at `path`
    fn create_file(&self, path: &Path) -> Result<(), FilesystemError>;

    /// Create a new empty directory; fails if anything exists at `path`
    fn create_directory(&self, path: &Path) -> Result<(), FilesystemError>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> Result<(), FilesystemError>;

    /// Remove an empty directory
    fn remove_directory(&self, path: &Path) -> Result<(), FilesystemError>;

    /// Move `from` to `to`
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FilesystemError>;

    /// Copy file contents from `from` to a new file at `to`
    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), FilesystemError>;

    /// Move a file that lives outside any volume (an uploaded temp file) to `to`
    fn import_file(&self, source: &Path, to: &Path) -> Result<(), FilesystemError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_paths() {
        let err = FilesystemError::NotFound("/srv/files/a.txt".to_string())
            .map_paths(|p| p.replace("/srv/files", "Home"));
        assert_eq!(err.to_string(), "Entry not found: Home/a.txt");

        let err = FilesystemError::InvalidName("../x".to_string()).map_paths(|_| String::new());
        assert_eq!(err.to_string(), "Invalid name: ../x");
    }
}
