//! Targets: single files or folders inside a volume

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::entry::EntryMetadata;
use super::filesystem::{Filesystem, FilesystemError};
use super::mime::DIRECTORY_MIME;
use super::naming::validate_name;
use super::volume::Volume;

/// One node in a volume, addressed by absolute path.
///
/// A target holds no metadata; callers fetch an [`EntryMetadata`] once per
/// command and pass it along.
#[derive(Clone)]
pub struct Target {
    volume: Arc<Volume>,
    path: PathBuf,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("volume", &self.volume.id())
            .field("path", &self.path)
            .finish()
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.volume.id() == other.volume.id() && self.path == other.path
    }
}

impl Eq for Target {}

impl Target {
    /// Only volumes construct targets, after scoping the path
    pub(crate) fn new(volume: Arc<Volume>, path: PathBuf) -> Self {
        Self { volume, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn volume(&self) -> &Arc<Volume> {
        &self.volume
    }

    fn fs(&self) -> &dyn Filesystem {
        self.volume.filesystem()
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    pub fn is_root(&self) -> bool {
        self.path == self.volume.root_path()
    }

    /// Last path segment, or the volume alias for a root
    pub fn name(&self) -> String {
        if self.is_root() {
            return self.volume.alias().to_string();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Alias-prefixed path shown to clients in place of the real path
    pub fn label(&self) -> String {
        self.volume.label(&self.path)
    }

    /// Parent target, `None` for a volume root
    pub fn parent(&self) -> Option<Target> {
        if self.is_root() {
            None
        } else {
            Some(self.volume.parent_of(&self.path))
        }
    }

    /// Whether `other` is this target or lies below it
    pub fn contains(&self, other: &Target) -> bool {
        self.volume.id() == other.volume.id() && other.path.starts_with(&self.path)
    }

    /// Fetch metadata, `None` when the node does not exist
    pub fn stat(&self) -> Result<Option<EntryMetadata>, FilesystemError> {
        self.fs().metadata(&self.path)
    }

    /// Fetch metadata of a node that must exist
    pub fn metadata(&self) -> Result<EntryMetadata, FilesystemError> {
        self.stat()?
            .ok_or_else(|| FilesystemError::NotFound(self.display()))
    }

    pub fn exists(&self) -> Result<bool, FilesystemError> {
        Ok(self.stat()?.is_some())
    }

    pub fn is_folder(&self) -> Result<bool, FilesystemError> {
        Ok(self.stat()?.map(|m| m.is_directory()).unwrap_or(false))
    }

    pub fn is_readable(&self) -> bool {
        self.fs().is_readable(&self.path)
    }

    /// MIME type for this node given its resolved metadata
    pub fn mime_type(&self, meta: &EntryMetadata) -> String {
        if meta.is_directory() {
            DIRECTORY_MIME.to_string()
        } else {
            self.volume.mime_resolver().mime_type(&self.path)
        }
    }

    /// Immediate children; fails with `NotADirectory` for files
    pub fn list_children(&self) -> Result<Vec<Target>, FilesystemError> {
        let paths = self.fs().list_directory(&self.path)?;
        paths
            .into_iter()
            .map(|path| self.volume.from_path(&path))
            .collect()
    }

    pub fn has_children(&self) -> Result<bool, FilesystemError> {
        Ok(!self.list_children()?.is_empty())
    }

    pub fn has_child_folder(&self) -> Result<bool, FilesystemError> {
        for child in self.list_children()? {
            if child.is_folder()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Child folders of this folder, each with its metadata
    pub fn child_folders(&self) -> Result<Vec<(Target, EntryMetadata)>, FilesystemError> {
        let mut folders = Vec::new();
        for child in self.list_children()? {
            if let Some(meta) = child.stat()? {
                if meta.is_directory() {
                    folders.push((child, meta));
                }
            }
        }
        Ok(folders)
    }

    /// Build (without creating) the child called `name`
    pub fn create_child(&self, name: &str) -> Result<Target, FilesystemError> {
        let name = validate_name(name)?;
        self.volume.from_path(&self.path.join(name))
    }

    /// Materialize this target as an empty file
    pub fn create_file(&self) -> Result<(), FilesystemError> {
        self.fs().create_file(&self.path)
    }

    /// Materialize this target as an empty folder
    pub fn create_folder(&self) -> Result<(), FilesystemError> {
        self.fs().create_directory(&self.path)
    }

    pub fn read_file(&self) -> Result<Vec<u8>, FilesystemError> {
        if self.is_folder()? {
            return Err(FilesystemError::IsADirectory(self.display()));
        }
        self.fs().read_file(&self.path)
    }

    pub fn write_file(&self, data: &[u8]) -> Result<(), FilesystemError> {
        if self.is_folder()? {
            return Err(FilesystemError::IsADirectory(self.display()));
        }
        self.fs().write_file(&self.path, data)
    }

    /// Seekable byte stream over the file contents
    pub fn open_input_stream(&self) -> Result<Cursor<Vec<u8>>, FilesystemError> {
        Ok(Cursor::new(self.read_file()?))
    }

    /// Delete a file or an empty folder
    pub fn delete(&self) -> Result<(), FilesystemError> {
        if self.metadata()?.is_directory() {
            self.fs().remove_directory(&self.path)
        } else {
            self.fs().remove_file(&self.path)
        }
    }

    /// Delete this node and everything below it
    pub fn delete_recursive(&self) -> Result<(), FilesystemError> {
        if self.metadata()?.is_directory() {
            for child in self.list_children()? {
                child.delete_recursive()?;
            }
            self.fs().remove_directory(&self.path)
        } else {
            self.fs().remove_file(&self.path)
        }
    }

    /// Move this node to `dest`, which must not exist yet
    pub fn rename(&self, dest: &Target) -> Result<(), FilesystemError> {
        self.fs().rename(&self.path, &dest.path)
    }

    /// Copy this node (recursively for folders) to `dest`, which must not exist yet
    pub fn copy_to(&self, dest: &Target) -> Result<(), FilesystemError> {
        let meta = self.metadata()?;
        if meta.is_directory() {
            dest.create_folder()?;
            for child in self.list_children()? {
                // on-disk names are copied byte for byte, without client-name validation
                let Some(name) = child.path.file_name() else {
                    continue;
                };
                let copy = Target::new(Arc::clone(&dest.volume), dest.path.join(name));
                child.copy_to(&copy)?;
            }
            return Ok(());
        }

        if Arc::ptr_eq(&self.volume, &dest.volume) {
            self.fs().copy_file(&self.path, &dest.path)
        } else {
            let data = self.read_file()?;
            dest.create_file()?;
            dest.write_file(&data)
        }
    }

    /// Move an external file (an upload) into place at this target
    pub fn import(&self, source: &Path) -> Result<(), FilesystemError> {
        self.fs().import_file(source, &self.path)
    }

    /// Size in bytes, summed over all descendants for folders
    pub fn total_size(&self) -> Result<u64, FilesystemError> {
        let meta = self.metadata()?;
        if !meta.is_directory() {
            return Ok(meta.size);
        }

        let mut total = 0u64;
        for child in self.list_children()? {
            total += child.total_size()?;
        }
        Ok(total)
    }
}
