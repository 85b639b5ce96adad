//! Local-disk storage backend

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::entry::EntryMetadata;
use super::filesystem::{Filesystem, FilesystemError};

/// Backend over the host filesystem using blocking `std::fs` calls
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

/// Map an io error for `path` onto the more specific variants where one applies
fn map_io(err: std::io::Error, path: &Path) -> FilesystemError {
    match err.kind() {
        ErrorKind::NotFound => FilesystemError::NotFound(path.display().to_string()),
        ErrorKind::AlreadyExists => FilesystemError::AlreadyExists(path.display().to_string()),
        _ => FilesystemError::Io(err),
    }
}

fn ensure_absent(path: &Path) -> Result<(), FilesystemError> {
    // symlink_metadata so a dangling link still counts as occupied
    if fs::symlink_metadata(path).is_ok() {
        return Err(FilesystemError::AlreadyExists(path.display().to_string()));
    }
    Ok(())
}

impl Filesystem for LocalFilesystem {
    fn metadata(&self, path: &Path) -> Result<Option<EntryMetadata>, FilesystemError> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FilesystemError::Io(e)),
        };

        let modified = meta.modified().ok();
        if meta.is_dir() {
            Ok(Some(EntryMetadata::directory(modified)))
        } else {
            Ok(Some(EntryMetadata::file(meta.len(), modified)))
        }
    }

    fn is_readable(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => fs::read_dir(path).is_ok(),
            Ok(_) => fs::File::open(path).is_ok(),
            Err(_) => false,
        }
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
        let meta = fs::metadata(path).map_err(|e| map_io(e, path))?;
        if !meta.is_dir() {
            return Err(FilesystemError::NotADirectory(path.display().to_string()));
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| map_io(e, path))? {
            children.push(entry?.path());
        }
        children.sort();
        Ok(children)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FilesystemError> {
        let meta = fs::metadata(path).map_err(|e| map_io(e, path))?;
        if meta.is_dir() {
            return Err(FilesystemError::IsADirectory(path.display().to_string()));
        }
        fs::read(path).map_err(|e| map_io(e, path))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FilesystemError> {
        if path.is_dir() {
            return Err(FilesystemError::IsADirectory(path.display().to_string()));
        }
        fs::write(path, data).map_err(|e| map_io(e, path))
    }

    fn create_file(&self, path: &Path) -> Result<(), FilesystemError> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| map_io(e, path))?;
        Ok(())
    }

    fn create_directory(&self, path: &Path) -> Result<(), FilesystemError> {
        fs::create_dir(path).map_err(|e| map_io(e, path))
    }

    fn remove_file(&self, path: &Path) -> Result<(), FilesystemError> {
        fs::remove_file(path).map_err(|e| map_io(e, path))
    }

    fn remove_directory(&self, path: &Path) -> Result<(), FilesystemError> {
        fs::remove_dir(path).map_err(|e| map_io(e, path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FilesystemError> {
        ensure_absent(to)?;
        fs::rename(from, to).map_err(|e| map_io(e, from))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), FilesystemError> {
        ensure_absent(to)?;
        fs::copy(from, to).map_err(|e| map_io(e, from))?;
        Ok(())
    }

    fn import_file(&self, source: &Path, to: &Path) -> Result<(), FilesystemError> {
        ensure_absent(to)?;
        if fs::rename(source, to).is_ok() {
            return Ok(());
        }

        // Temp dirs usually live on another device, where rename is refused
        log::debug!("rename of {} failed, copying instead", source.display());
        fs::copy(source, to).map_err(|e| map_io(e, source))?;
        if let Err(e) = fs::remove_file(source) {
            log::warn!("Failed to remove upload temp file {}: {}", source.display(), e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert!(fs.metadata(&dir.path().join("nope")).unwrap().is_none());
        assert!(fs.metadata(dir.path()).unwrap().unwrap().is_directory());
    }

    #[test]
    fn test_create_file_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = dir.path().join("a.txt");
        fs.create_file(&path).unwrap();
        assert!(matches!(
            fs.create_file(&path),
            Err(FilesystemError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_list_directory_sorted() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        std::fs::write(dir.path().join("b"), b"").unwrap();
        std::fs::write(dir.path().join("a"), b"").unwrap();

        let children = fs.list_directory(dir.path()).unwrap();
        assert_eq!(children, vec![dir.path().join("a"), dir.path().join("b")]);

        assert!(matches!(
            fs.list_directory(&dir.path().join("a")),
            Err(FilesystemError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert!(matches!(
            fs.read_file(dir.path()),
            Err(FilesystemError::IsADirectory(_))
        ));
    }

    #[test]
    fn test_rename_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"one").unwrap();
        std::fs::write(&b, b"two").unwrap();

        assert!(matches!(fs.rename(&a, &b), Err(FilesystemError::AlreadyExists(_))));
        assert_eq!(std::fs::read(&b).unwrap(), b"two");
    }

    #[test]
    fn test_import_file_moves_source() {
        let outside = TempDir::new().unwrap();
        let volume = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        let source = outside.path().join("upload.tmp");
        std::fs::write(&source, b"payload").unwrap();
        let dest = volume.path().join("photo.jpg");

        fs.import_file(&source, &dest).unwrap();
        assert!(!source.exists());
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }
}
