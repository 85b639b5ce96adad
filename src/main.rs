//! elFinder Connector
//!
//! Serves the volumes listed in config.json (or ELFINDER_VOLUMES) over HTTP.

use std::process::ExitCode;
use std::sync::Arc;

use elfinder_connector::config::ConnectorConfig;
use elfinder_connector::connector::Connector;
use elfinder_connector::server;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ConnectorConfig::load();
    let volumes = match config.volumes() {
        Ok(volumes) => volumes,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let connector = Connector::new(volumes.into_iter().map(Arc::new).collect(), config.settings());
    match server::serve(connector, &config.bind, config.workers) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
