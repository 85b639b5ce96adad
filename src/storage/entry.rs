//! Resolved metadata for volume entries

use std::time::{SystemTime, UNIX_EPOCH};

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// Metadata for one node, fetched from the backend once per command invocation.
///
/// Commands hold on to this value and pass it along instead of asking the
/// backend again, so a `Target` itself never caches anything.
#[derive(Debug, Clone)]
pub struct EntryMetadata {
    /// Entry type (file or directory)
    pub entry_type: EntryType,
    /// File size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time, if the backend reports one
    pub modified: Option<SystemTime>,
}

impl EntryMetadata {
    /// Create metadata for a file
    pub fn file(size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            entry_type: EntryType::File,
            size,
            modified,
        }
    }

    /// Create metadata for a directory
    pub fn directory(modified: Option<SystemTime>) -> Self {
        Self {
            entry_type: EntryType::Directory,
            size: 0,
            modified,
        }
    }

    /// Check if this is a directory
    pub fn is_directory(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    /// Last modification time as seconds since the Unix epoch (0 when unknown)
    pub fn timestamp(&self) -> u64 {
        self.modified
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
