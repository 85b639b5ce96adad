//! Per-request command context

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::codec;
use super::error::ConnectorError;
use crate::storage::{Target, Volume};

/// Flat request parameters; a key may carry several values (`targets[]`)
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, Vec<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `key`
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values for `key`, in request order
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True only for the literal value `"1"`
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.push(key, value);
        }
        params
    }
}

/// An uploaded file already written to a temporary location
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file arrived in
    pub field_name: String,
    /// File name as sent by the client
    pub original_filename: String,
    /// Where the upload layer stored the bytes
    pub path: PathBuf,
}

/// Connector-wide settings reported to clients
#[derive(Debug, Clone)]
pub struct ConnectorSettings {
    /// Commands rejected by the dispatcher
    pub disabled: Vec<String>,
    /// Upload limit advertised on `open` with `init`
    pub upload_max_size: String,
    /// Base URL of the connector, used for thumbnail links
    pub connector_url: String,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            upload_max_size: "16M".to_string(),
            connector_url: "/connector".to_string(),
        }
    }
}

/// Everything a command may look at while serving one request
pub struct CaptureContext<'a> {
    volumes: &'a [Arc<Volume>],
    params: &'a Params,
    uploads: &'a [UploadedFile],
    settings: &'a ConnectorSettings,
}

impl<'a> CaptureContext<'a> {
    pub fn new(
        volumes: &'a [Arc<Volume>],
        params: &'a Params,
        uploads: &'a [UploadedFile],
        settings: &'a ConnectorSettings,
    ) -> Self {
        Self {
            volumes,
            params,
            uploads,
            settings,
        }
    }

    pub fn volumes(&self) -> &'a [Arc<Volume>] {
        self.volumes
    }

    pub fn uploads(&self) -> &'a [UploadedFile] {
        self.uploads
    }

    pub fn settings(&self) -> &'a ConnectorSettings {
        self.settings
    }

    pub fn param(&self, key: &str) -> Option<&'a str> {
        self.params.get(key)
    }

    pub fn params(&self, key: &str) -> &'a [String] {
        self.params.get_all(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.params.flag(key)
    }

    /// Present, non-empty and not `"0"`
    pub fn is_set(&self, key: &str) -> bool {
        self.param(key).is_some_and(|v| !v.is_empty() && v != "0")
    }

    /// A parameter that must be present and non-empty
    pub fn require(&self, key: &'static str) -> Result<&'a str, ConnectorError> {
        self.param(key)
            .filter(|v| !v.is_empty())
            .ok_or(ConnectorError::MissingParameter(key))
    }

    /// Decode a handle, treating anything unresolvable as not found
    pub fn resolve(&self, handle: &str) -> Result<Target, ConnectorError> {
        codec::decode(self.volumes, handle).ok_or_else(|| ConnectorError::NotFound(handle.to_string()))
    }

    /// Resolve the handle in a required parameter
    pub fn target(&self, key: &'static str) -> Result<Target, ConnectorError> {
        self.resolve(self.require(key)?)
    }

    /// Resolve the handle in an optional parameter; absent or unresolvable gives `None`
    pub fn optional_target(&self, key: &str) -> Option<Target> {
        self.param(key)
            .filter(|v| !v.is_empty())
            .and_then(|handle| codec::decode(self.volumes, handle))
    }

    /// Resolve every handle in a multi-valued parameter
    pub fn targets(&self, key: &'static str) -> Result<Vec<Target>, ConnectorError> {
        let handles = self.params(key);
        if handles.is_empty() {
            return Err(ConnectorError::MissingParameter(key));
        }
        handles.iter().map(|h| self.resolve(h)).collect()
    }

    /// Client-facing form of `path`: its volume label, or just the last segment
    /// when it lies in no volume
    fn path_label(&self, path: &str) -> String {
        let path = Path::new(path);
        match self.volumes.iter().find(|v| v.contains(path)) {
            Some(volume) => volume.label(path),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Replace server paths in `err` with volume labels before it reaches a client
    pub fn redact(&self, err: ConnectorError) -> ConnectorError {
        match err {
            ConnectorError::Filesystem(e) => {
                ConnectorError::Filesystem(e.map_paths(|p| self.path_label(p)))
            }
            other => other,
        }
    }

    /// Root of the first configured volume
    pub fn default_root(&self) -> Option<Target> {
        self.volumes.first().map(|v| v.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FilesystemError;
    use tempfile::TempDir;

    #[test]
    fn test_params_multi_values() {
        let params = Params::new()
            .with("targets[]", "a")
            .with("targets[]", "b")
            .with("cut", "1")
            .with("download", "true");

        assert_eq!(params.get("targets[]"), Some("a"));
        assert_eq!(params.get_all("targets[]"), ["a", "b"]);
        assert!(params.get_all("missing").is_empty());
        assert!(params.flag("cut"));
        assert!(!params.flag("download"));
    }

    #[test]
    fn test_resolve_and_require() {
        let dir = TempDir::new().unwrap();
        let volumes = vec![Arc::new(Volume::local("A", None, dir.path()))];
        let root_handle = codec::root_handle(&volumes[0]);
        let params = Params::new()
            .with("target", root_handle)
            .with("bad", "Z_abc")
            .with("name", "");
        let settings = ConnectorSettings::default();
        let ctx = CaptureContext::new(&volumes, &params, &[], &settings);

        assert!(ctx.target("target").unwrap().is_root());
        assert!(matches!(ctx.resolve("Z_abc"), Err(ConnectorError::NotFound(_))));
        assert!(ctx.optional_target("bad").is_none());
        assert!(matches!(
            ctx.require("name"),
            Err(ConnectorError::MissingParameter("name"))
        ));
        assert!(matches!(
            ctx.targets("targets[]"),
            Err(ConnectorError::MissingParameter(_))
        ));
        assert!(ctx.default_root().unwrap().is_root());
    }

    #[test]
    fn test_redact_replaces_server_paths() {
        let dir = TempDir::new().unwrap();
        let volumes = vec![Arc::new(Volume::local("A", Some("Home".to_string()), dir.path()))];
        let params = Params::new();
        let settings = ConnectorSettings::default();
        let ctx = CaptureContext::new(&volumes, &params, &[], &settings);

        let missing = dir.path().join("docs/gone.txt").display().to_string();
        let err = ctx.redact(FilesystemError::NotFound(missing).into());
        assert_eq!(err.to_string(), "Entry not found: Home/docs/gone.txt");

        let err = ctx.redact(FilesystemError::IsADirectory(dir.path().display().to_string()).into());
        assert_eq!(err.to_string(), "Is a directory: Home");

        let err = ctx.redact(FilesystemError::OutOfScope("/etc/passwd".to_string()).into());
        assert_eq!(err.to_string(), "Path is outside of volume: passwd");

        let err = ctx.redact(ConnectorError::NotFound("A_xyz".to_string()));
        assert_eq!(err.to_string(), "file not found: A_xyz");
    }
}
