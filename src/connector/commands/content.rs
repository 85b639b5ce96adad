//! File content commands: get, put, file

use serde_json::{Map, Value};

use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, FileReply, Reply};
use crate::connector::error::ConnectorError;
use crate::connector::serializer;

/// `get`: file contents as UTF-8 text
pub struct Get;

impl Command for Get {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let target = ctx.target("target")?;
        let bytes = target.read_file()?;
        let content = String::from_utf8(bytes).map_err(|_| ConnectorError::NotText(target.name()))?;

        let mut body = Map::new();
        body.insert("content".into(), Value::from(content));
        Ok(Reply::Json(body))
    }
}

/// `put`: replace file contents with UTF-8 text
pub struct Put;

impl Command for Put {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let target = ctx.target("target")?;
        let content = ctx.param("content").unwrap_or_default();
        // put only rewrites; it never creates
        target.metadata()?;
        target.write_file(content.as_bytes())?;
        log::info!("Wrote {} bytes to {}", content.len(), target.path().display());

        let mut body = Map::new();
        body.insert(
            "changed".into(),
            Value::Array(vec![serializer::info(ctx.settings(), &target)?]),
        );
        Ok(Reply::Json(body))
    }
}

/// `file`: raw file bytes for viewing or download
pub struct File;

impl Command for File {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let target = ctx.target("target")?;
        let meta = target.metadata()?;
        let data = target.read_file()?;

        Ok(Reply::File(FileReply {
            name: target.name(),
            mime: target.mime_type(&meta),
            data,
            attachment: ctx.flag("download"),
        }))
    }
}
