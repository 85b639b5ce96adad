//! Command registry and dispatch

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::context::CaptureContext;
use super::error::ConnectorError;

/// Raw file contents returned instead of JSON
#[derive(Debug, Clone)]
pub struct FileReply {
    pub name: String,
    pub mime: String,
    pub data: Vec<u8>,
    /// Ask the client to save rather than display
    pub attachment: bool,
}

/// Complete response body of one request
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Map<String, Value>),
    File(FileReply),
}

impl Reply {
    /// `{"error": "<message>"}`
    pub fn error(err: &ConnectorError) -> Self {
        let mut body = Map::new();
        body.insert("error".into(), Value::from(err.to_string()));
        Reply::Json(body)
    }

    /// JSON body, if this is a JSON reply
    pub fn as_json(&self) -> Option<&Map<String, Value>> {
        match self {
            Reply::Json(body) => Some(body),
            Reply::File(_) => None,
        }
    }
}

/// One protocol operation
pub trait Command: Send + Sync {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError>;
}

/// Maps `cmd` names to commands
pub struct Dispatcher {
    commands: HashMap<&'static str, Box<dyn Command>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with no commands registered
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Dispatcher with every built-in command registered
    pub fn new() -> Self {
        let mut dispatcher = Self::empty();
        super::commands::register_all(&mut dispatcher);
        dispatcher
    }

    pub fn register(&mut self, name: &'static str, command: Box<dyn Command>) {
        self.commands.insert(name, command);
    }

    fn resolve(&self, ctx: &CaptureContext<'_>) -> Result<&dyn Command, ConnectorError> {
        let name = ctx.param("cmd").unwrap_or_default();
        if ctx.settings().disabled.iter().any(|d| d == name) {
            return Err(ConnectorError::CommandDisabled(name.to_string()));
        }
        self.commands
            .get(name)
            .map(|c| c.as_ref())
            .ok_or_else(|| ConnectorError::UnknownCommand(name.to_string()))
    }

    /// Resolve and run the requested command. Always yields a complete reply:
    /// the command's own body, or an error body replacing it entirely.
    pub fn dispatch(&self, ctx: &CaptureContext<'_>) -> Reply {
        let name = ctx.param("cmd").unwrap_or_default();
        log::debug!("Dispatching command '{}'", name);

        let result = self.resolve(ctx).and_then(|command| {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| command.execute(ctx)))
                .unwrap_or_else(|_| {
                    Err(ConnectorError::Internal(format!("command '{}' panicked", name)))
                })
        });

        match result {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Command '{}' failed: {}", name, e);
                Reply::error(&ctx.redact(e))
            }
        }
    }
}
