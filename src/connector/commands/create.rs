//! mkdir and mkfile

use super::{require_folder, Changes};
use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;
use crate::storage::Target;

/// Resolve the parent folder and build the named child, without creating it
fn new_child(ctx: &CaptureContext<'_>) -> Result<Target, ConnectorError> {
    let parent = ctx.target("target")?;
    require_folder(&parent)?;
    Ok(parent.create_child(ctx.require("name")?)?)
}

/// `mkdir`: create an empty folder
pub struct Mkdir;

impl Command for Mkdir {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let child = new_child(ctx)?;
        child.create_folder()?;
        log::info!("Created folder {}", child.path().display());

        let mut changes = Changes::default();
        changes.add(ctx, &child)?;
        Ok(Reply::Json(changes.into_body()))
    }
}

/// `mkfile`: create an empty file
pub struct Mkfile;

impl Command for Mkfile {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let child = new_child(ctx)?;
        child.create_file()?;
        log::info!("Created file {}", child.path().display());

        let mut changes = Changes::default();
        changes.add(ctx, &child)?;
        Ok(Reply::Json(changes.into_body()))
    }
}
