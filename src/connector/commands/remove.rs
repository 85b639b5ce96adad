//! rm

use serde_json::Value;

use super::Changes;
use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;
use crate::storage::Target;

/// Delete one target, refusing roots and non-empty folders
fn remove_one(target: &Target) -> Result<(), ConnectorError> {
    if target.is_root() {
        return Err(ConnectorError::Unsupported("removing a volume root"));
    }
    if target.metadata()?.is_directory() && target.has_children()? {
        return Err(ConnectorError::DirectoryNotEmpty(target.name()));
    }
    Ok(target.delete()?)
}

/// `rm`: delete files and empty folders.
///
/// Each target succeeds or fails on its own. Failures (a non-empty folder, a
/// volume root, a vanished entry) are reported under `warning` while
/// `removed` lists everything that was actually deleted.
pub struct Rm;

impl Command for Rm {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let handles = ctx.params("targets[]");
        if handles.is_empty() {
            return Err(ConnectorError::MissingParameter("targets[]"));
        }

        let mut changes = Changes::default();
        let mut warnings = Vec::new();
        for handle in handles {
            let result = ctx.resolve(handle).and_then(|target| {
                remove_one(&target)?;
                Ok(target)
            });
            match result {
                Ok(target) => {
                    log::info!("Removed {}", target.path().display());
                    changes.remove(&target);
                }
                Err(e) => {
                    log::info!("Not removing {}: {}", handle, e);
                    warnings.push(Value::from(ctx.redact(e).to_string()));
                }
            }
        }

        let mut body = changes.into_body();
        if !warnings.is_empty() {
            body.insert("warning".into(), Value::Array(warnings));
        }
        Ok(Reply::Json(body))
    }
}
