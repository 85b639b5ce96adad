//! The elFinder command connector
//!
//! Turns one request's flat parameters (plus any uploaded files) into one
//! complete [`Reply`]. Targets are addressed by opaque handles produced by
//! [`codec`]; commands never see raw client paths.

pub mod codec;
pub mod commands;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod serializer;

use std::sync::Arc;

pub use context::{CaptureContext, ConnectorSettings, Params, UploadedFile};
pub use dispatcher::{Command, Dispatcher, FileReply, Reply};
pub use error::ConnectorError;

use crate::storage::Volume;

/// Configured volumes, settings and the command registry, shared by every
/// worker thread
pub struct Connector {
    volumes: Vec<Arc<Volume>>,
    settings: ConnectorSettings,
    dispatcher: Dispatcher,
}

impl Connector {
    pub fn new(volumes: Vec<Arc<Volume>>, settings: ConnectorSettings) -> Self {
        for volume in &volumes {
            log::info!(
                "Serving volume {} ({}) from {}",
                volume.id(),
                volume.alias(),
                volume.root_path().display()
            );
        }
        Self {
            volumes,
            settings,
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn volumes(&self) -> &[Arc<Volume>] {
        &self.volumes
    }

    pub fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    /// Run the command named by `cmd`
    pub fn handle(&self, params: &Params, uploads: &[UploadedFile]) -> Reply {
        let ctx = CaptureContext::new(&self.volumes, params, uploads, &self.settings);
        self.dispatcher.dispatch(&ctx)
    }
}
