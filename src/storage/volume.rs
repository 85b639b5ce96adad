//! Volumes: named, rooted scopes over a storage backend

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::filesystem::{Filesystem, FilesystemError};
use super::local::LocalFilesystem;
use super::mime::{ExtensionMimeResolver, MimeResolver};
use super::target::Target;

#[cfg(unix)]
fn segment_bytes(segment: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    segment.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn segment_bytes(segment: &OsStr) -> Vec<u8> {
    segment.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
fn segment_from_bytes(bytes: &[u8]) -> Option<OsString> {
    use std::os::unix::ffi::OsStrExt;
    Some(OsStr::from_bytes(bytes).to_os_string())
}

#[cfg(not(unix))]
fn segment_from_bytes(bytes: &[u8]) -> Option<OsString> {
    String::from_utf8(bytes.to_vec()).ok().map(OsString::from)
}

/// A configured storage area exposed to clients.
///
/// A volume only builds and scopes targets; it does no I/O of its own.
pub struct Volume {
    id: String,
    alias: String,
    root: PathBuf,
    filesystem: Arc<dyn Filesystem>,
    mime: Arc<dyn MimeResolver>,
}

impl fmt::Debug for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Volume")
            .field("id", &self.id)
            .field("alias", &self.alias)
            .field("root", &self.root)
            .finish()
    }
}

impl Volume {
    /// Create a volume over an arbitrary backend
    pub fn new(
        id: impl Into<String>,
        alias: Option<String>,
        root: impl Into<PathBuf>,
        filesystem: Arc<dyn Filesystem>,
        mime: Arc<dyn MimeResolver>,
    ) -> Self {
        let id = id.into();
        Self {
            alias: alias.unwrap_or_else(|| id.clone()),
            id,
            root: root.into(),
            filesystem,
            mime,
        }
    }

    /// Create a volume over a local directory
    pub fn local(id: impl Into<String>, alias: Option<String>, root: impl Into<PathBuf>) -> Self {
        Self::new(
            id,
            alias,
            root,
            Arc::new(LocalFilesystem::new()),
            Arc::new(ExtensionMimeResolver),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.filesystem.as_ref()
    }

    pub fn mime_resolver(&self) -> &dyn MimeResolver {
        self.mime.as_ref()
    }

    /// The volume's root target
    pub fn root(self: &Arc<Self>) -> Target {
        Target::new(Arc::clone(self), self.root.clone())
    }

    /// Build a target for an absolute path, which must lie within the root
    pub fn from_path(self: &Arc<Self>, path: &Path) -> Result<Target, FilesystemError> {
        if !self.contains(path) {
            return Err(FilesystemError::OutOfScope(path.display().to_string()));
        }
        Ok(Target::new(Arc::clone(self), path.to_path_buf()))
    }

    /// Build a target from a `/`-separated path relative to the root.
    ///
    /// `""` and `"/"` name the root. Any `..` or `.` segment is refused.
    pub fn from_relative(self: &Arc<Self>, relative: &str) -> Result<Target, FilesystemError> {
        self.from_relative_bytes(relative.as_bytes())
    }

    /// Like [`from_relative`](Self::from_relative), over raw name bytes.
    ///
    /// Segments are taken verbatim; only `.`, `..` and NUL bytes are refused.
    pub fn from_relative_bytes(self: &Arc<Self>, relative: &[u8]) -> Result<Target, FilesystemError> {
        let out_of_scope = || FilesystemError::OutOfScope(String::from_utf8_lossy(relative).into_owned());

        let mut path = self.root.clone();
        for segment in relative.split(|b| *b == b'/').filter(|s| !s.is_empty()) {
            if segment == b"." || segment == b".." || segment.contains(&0) {
                return Err(out_of_scope());
            }
            path.push(segment_from_bytes(segment).ok_or_else(out_of_scope)?);
        }
        self.from_path(&path)
    }

    /// Target one level above `path`; the root is its own parent
    pub fn parent_of(self: &Arc<Self>, path: &Path) -> Target {
        match path.parent() {
            Some(parent) if self.contains(parent) && parent != self.root => {
                Target::new(Arc::clone(self), parent.to_path_buf())
            }
            _ => self.root(),
        }
    }

    /// Whether `path` is the root or below it, with no `..` segments
    pub fn contains(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(rest) => rest.components().all(|c| matches!(c, Component::Normal(_))),
            Err(_) => false,
        }
    }

    /// Exact bytes of `path` relative to the root, `/`-separated; `"/"` for the root
    pub fn relative_bytes(&self, path: &Path) -> Vec<u8> {
        let rest = path.strip_prefix(&self.root).unwrap_or(path);
        let segments: Vec<_> = rest
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(segment_bytes(s)),
                _ => None,
            })
            .collect();

        if segments.is_empty() {
            b"/".to_vec()
        } else {
            segments.join(&b'/')
        }
    }

    /// Client-facing label for `path`: the alias, then the relative path
    pub fn label(&self, path: &Path) -> String {
        let relative = self.relative_path(path);
        if relative == "/" {
            self.alias.clone()
        } else {
            format!("{}/{}", self.alias, relative)
        }
    }

    /// Path of `path` relative to the root for display, `/`-separated; `"/"` for the root itself
    pub fn relative_path(&self, path: &Path) -> String {
        let rest = path.strip_prefix(&self.root).unwrap_or(path);
        let segments: Vec<_> = rest
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect();

        if segments.is_empty() {
            "/".to_string()
        } else {
            segments.join("/")
        }
    }
}
