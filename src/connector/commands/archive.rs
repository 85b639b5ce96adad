//! archive and extract
//!
//! No archivers are configured, so both commands are registered only to
//! answer with a clear error instead of "unknown command".

use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;

pub struct Archive;

impl Command for Archive {
    fn execute(&self, _ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        Err(ConnectorError::Unsupported("archive"))
    }
}

pub struct Extract;

impl Command for Extract {
    fn execute(&self, _ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        Err(ConnectorError::Unsupported("extract"))
    }
}
