//! Volume storage module
//!
//! Volumes are rooted scopes over a storage backend; targets are the files
//! and folders inside them. The local-disk backend is the only one shipped.

pub mod entry;
pub mod filesystem;
pub mod local;
pub mod mime;
pub mod naming;
pub mod target;
pub mod volume;

pub use entry::{EntryMetadata, EntryType};
pub use filesystem::{Filesystem, FilesystemError};
pub use local::LocalFilesystem;
pub use mime::{ExtensionMimeResolver, MimeResolver, DIRECTORY_MIME};
pub use target::Target;
pub use volume::Volume;
