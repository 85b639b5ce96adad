//! rename

use super::Changes;
use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;

/// `rename`: give a target a new name in the same folder
pub struct Rename;

impl Command for Rename {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let target = ctx.target("target")?;
        let name = ctx.require("name")?;
        let parent = target
            .parent()
            .ok_or(ConnectorError::Unsupported("renaming a volume root"))?;

        let dest = parent.create_child(name)?;
        target.rename(&dest)?;
        log::info!("Renamed {} to {}", target.path().display(), dest.path().display());

        let mut changes = Changes::default();
        changes.add(ctx, &dest)?;
        changes.remove(&target);
        Ok(Reply::Json(changes.into_body()))
    }
}
