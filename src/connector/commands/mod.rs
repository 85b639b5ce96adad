//! Protocol commands
//!
//! Each command is a unit struct registered under its `cmd` name. Shared
//! helpers for building `added`/`removed` bodies and picking free names live
//! here.

mod archive;
mod content;
mod create;
mod inspect;
mod navigate;
mod remove;
mod rename;
mod search;
mod transfer;

use serde_json::{Map, Value};

use super::codec;
use super::context::CaptureContext;
use super::dispatcher::{Dispatcher, Reply};
use super::error::ConnectorError;
use super::serializer;
use crate::storage::{naming, FilesystemError, Target};

pub use archive::{Archive, Extract};
pub use content::{File, Get, Put};
pub use create::{Mkdir, Mkfile};
pub use inspect::{Dim, Info, Size};
pub use navigate::{Ls, Open, Parents, Tree};
pub use remove::Rm;
pub use rename::Rename;
pub use search::Search;
pub use transfer::{Duplicate, Paste, Upload};

/// Register every built-in command
pub fn register_all(dispatcher: &mut Dispatcher) {
    dispatcher.register("open", Box::new(Open));
    dispatcher.register("ls", Box::new(Ls));
    dispatcher.register("tree", Box::new(Tree));
    dispatcher.register("parents", Box::new(Parents));
    dispatcher.register("mkdir", Box::new(Mkdir));
    dispatcher.register("mkfile", Box::new(Mkfile));
    dispatcher.register("rm", Box::new(Rm));
    dispatcher.register("rename", Box::new(Rename));
    dispatcher.register("paste", Box::new(Paste));
    dispatcher.register("duplicate", Box::new(Duplicate));
    dispatcher.register("upload", Box::new(Upload));
    dispatcher.register("get", Box::new(Get));
    dispatcher.register("put", Box::new(Put));
    dispatcher.register("file", Box::new(File));
    dispatcher.register("size", Box::new(Size));
    dispatcher.register("dim", Box::new(Dim));
    dispatcher.register("info", Box::new(Info));
    dispatcher.register("search", Box::new(Search));
    dispatcher.register("archive", Box::new(Archive));
    dispatcher.register("extract", Box::new(Extract));
}

/// Accumulated effects of a mutating command
#[derive(Debug, Default)]
struct Changes {
    added: Vec<Value>,
    removed: Vec<Value>,
}

impl Changes {
    fn add(&mut self, ctx: &CaptureContext<'_>, target: &Target) -> Result<(), ConnectorError> {
        self.added.push(serializer::info(ctx.settings(), target)?);
        Ok(())
    }

    fn remove(&mut self, target: &Target) {
        self.removed.push(Value::from(codec::encode(target)));
    }

    fn into_body(self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("added".into(), Value::Array(self.added));
        body.insert("removed".into(), Value::Array(self.removed));
        body
    }
}

/// Info objects for several targets
fn infos(ctx: &CaptureContext<'_>, targets: &[Target]) -> Result<Vec<Value>, ConnectorError> {
    targets
        .iter()
        .map(|t| serializer::info(ctx.settings(), t))
        .collect()
}

fn require_folder(target: &Target) -> Result<(), ConnectorError> {
    if target.metadata()?.is_directory() {
        Ok(())
    } else {
        Err(FilesystemError::NotADirectory(target.path().display().to_string()).into())
    }
}

/// Child of `parent` named after `name` that does not exist yet, using the
/// `(n)` numbering scheme. With `keep_original`, `name` itself is preferred.
fn unique_child(parent: &Target, name: &str, keep_original: bool) -> Result<Target, ConnectorError> {
    let free = naming::free_name(name, keep_original, |candidate| {
        parent.create_child(candidate)?.exists()
    })?;
    let free = free.ok_or_else(|| ConnectorError::NameExhausted(name.to_string()))?;
    Ok(parent.create_child(&free)?)
}

/// Destination for an incoming entry called `name` inside `parent`.
///
/// If the name is taken and listed in `renames[]`, the existing entry is moved
/// aside to a numbered name and the incoming entry keeps `name`. Otherwise, or
/// when the existing entry is `source` itself, a taken name gets a numbered
/// variant.
fn incoming_destination(
    ctx: &CaptureContext<'_>,
    parent: &Target,
    name: &str,
    source: Option<&Target>,
    changes: &mut Changes,
) -> Result<Target, ConnectorError> {
    let wanted = parent.create_child(name)?;
    if !wanted.exists()? {
        return Ok(wanted);
    }

    let is_source = source == Some(&wanted);
    if !is_source && ctx.params("renames[]").iter().any(|n| n == name) {
        let backup = unique_child(parent, name, false)?;
        log::debug!("Moving existing {} aside to {}", wanted.path().display(), backup.name());
        wanted.rename(&backup)?;
        changes.remove(&wanted);
        changes.add(ctx, &backup)?;
        return Ok(wanted);
    }

    unique_child(parent, name, false)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by command tests

    use std::sync::Arc;

    use serde_json::{Map, Value};
    use tempfile::TempDir;

    use crate::connector::codec;
    use crate::connector::context::{ConnectorSettings, Params, UploadedFile};
    use crate::connector::Connector;
    use crate::storage::{Target, Volume};

    pub struct Fixture {
        pub dir: TempDir,
        pub connector: Connector,
    }

    impl Fixture {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let volume = Volume::local("ROOT", None, dir.path());
            let connector = Connector::new(vec![Arc::new(volume)], ConnectorSettings::default());
            Self { dir, connector }
        }

        pub fn volume(&self) -> &Arc<Volume> {
            &self.connector.volumes()[0]
        }

        pub fn root(&self) -> Target {
            self.volume().root()
        }

        pub fn root_handle(&self) -> String {
            codec::root_handle(self.volume())
        }

        pub fn handle(&self, relative: &str) -> String {
            codec::encode(&self.volume().from_relative(relative).unwrap())
        }

        pub fn write(&self, relative: &str, data: &[u8]) {
            let path = self.dir.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, data).unwrap();
        }

        pub fn mkdir(&self, relative: &str) {
            std::fs::create_dir_all(self.dir.path().join(relative)).unwrap();
        }

        pub fn exists(&self, relative: &str) -> bool {
            self.dir.path().join(relative).exists()
        }

        pub fn run(&self, params: Params) -> Map<String, Value> {
            self.run_with_uploads(params, &[])
        }

        pub fn run_with_uploads(&self, params: Params, uploads: &[UploadedFile]) -> Map<String, Value> {
            self.connector
                .handle(&params, uploads)
                .as_json()
                .cloned()
                .expect("json reply")
        }
    }

    /// Names of the info objects in a JSON array
    pub fn names(value: &Value) -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["name"].as_str().unwrap().to_string())
            .collect()
    }
}
