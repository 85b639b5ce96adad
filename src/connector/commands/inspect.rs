//! Read-only inspection commands: size, dim, info

use image::ImageReader;
use serde_json::{Map, Value};

use super::infos;
use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;

/// `size`: total bytes of the targets, folders counted recursively.
///
/// One unreadable target fails the whole sum.
pub struct Size;

impl Command for Size {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let mut total = 0u64;
        for target in ctx.targets("targets[]")? {
            total += target.total_size()?;
        }

        let mut body = Map::new();
        body.insert("size".into(), Value::from(total));
        Ok(Reply::Json(body))
    }
}

/// `dim`: pixel dimensions of an image as `"WxH"`
pub struct Dim;

impl Command for Dim {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let target = ctx.target("target")?;
        let stream = target.open_input_stream()?;

        let (width, height) = ImageReader::new(stream)
            .with_guessed_format()
            .map_err(|e| ConnectorError::Image(e.to_string()))?
            .into_dimensions()
            .map_err(|e| ConnectorError::Image(e.to_string()))?;
        log::debug!("{} is {}x{}", target.path().display(), width, height);

        let mut body = Map::new();
        body.insert("dim".into(), Value::from(format!("{}x{}", width, height)));
        Ok(Reply::Json(body))
    }
}

/// `info`: info objects for the given targets
pub struct Info;

impl Command for Info {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let targets = ctx.targets("targets[]")?;

        let mut body = Map::new();
        body.insert("files".into(), Value::Array(infos(ctx, &targets)?));
        Ok(Reply::Json(body))
    }
}
