//! Application configuration
//!
//! Handles loading the connector configuration from config.json, applying
//! environment overrides and turning the volume list into [`Volume`]s.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::connector::ConnectorSettings;
use crate::storage::Volume;

/// Environment variable overriding [`ConnectorConfig::volumes`]
pub const VOLUMES_ENV: &str = "ELFINDER_VOLUMES";

/// Environment variable overriding [`ConnectorConfig::bind`]
pub const BIND_ENV: &str = "ELFINDER_BIND";

/// Errors that make a configuration unusable
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No volumes configured (set \"volumes\" in config.json or ELFINDER_VOLUMES)")]
    NoVolumes,

    #[error("Malformed volume entry '{0}', expected <id>:<directory>")]
    MalformedEntry(String),

    #[error("Invalid volume id '{0}': use only letters and digits")]
    InvalidId(String),

    #[error("Duplicate volume id '{0}'")]
    DuplicateId(String),

    #[error("Volume root for '{id}' is not a directory: {root}")]
    NotADirectory { id: String, root: String },

    #[error("IO error for volume root {0}: {1}")]
    Io(String, #[source] std::io::Error),
}

/// Root connector configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConnectorConfig {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Comma-separated `id:directory` list
    #[serde(default)]
    pub volumes: String,
    /// Display names keyed by volume id
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Commands to reject
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Request worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Upload limit reported to clients
    #[serde(default = "default_upload_max_size")]
    pub upload_max_size: String,
    /// Public URL of the connector endpoint
    #[serde(default = "default_connector_url")]
    pub connector_url: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_upload_max_size() -> String {
    "16M".to_string()
}

fn default_connector_url() -> String {
    "/connector".to_string()
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            volumes: String::new(),
            aliases: HashMap::new(),
            disabled: Vec::new(),
            workers: default_workers(),
            upload_max_size: default_upload_max_size(),
            connector_url: default_connector_url(),
        }
    }
}

impl ConnectorConfig {
    /// Load configuration from config.json, then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        // Try to load from current directory first
        if let Ok(config) = Self::load_from_path("config.json") {
            log::info!("Loaded config from ./config.json");
            return config;
        }

        // Try to load from executable directory
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let config_path = exe_dir.join("config.json");
                if let Ok(config) = Self::load_from_path(&config_path) {
                    log::info!("Loaded config from {}", config_path.display());
                    return config;
                }
            }
        }

        log::info!("No config.json found, using defaults");
        Self::default()
    }

    fn load_from_path(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        let config: ConnectorConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Replace fields whose environment variable is set and non-empty
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(volumes) = lookup(VOLUMES_ENV).filter(|v| !v.trim().is_empty()) {
            log::debug!("Volumes overridden by {}", VOLUMES_ENV);
            self.volumes = volumes;
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            log::debug!("Bind address overridden by {}", BIND_ENV);
            self.bind = bind;
        }
    }

    /// Settings handed to the connector
    pub fn settings(&self) -> ConnectorSettings {
        ConnectorSettings {
            disabled: self.disabled.clone(),
            upload_max_size: self.upload_max_size.clone(),
            connector_url: self.connector_url.clone(),
        }
    }

    /// Parse and validate the volume list, in configured order
    pub fn volumes(&self) -> Result<Vec<Volume>, ConfigError> {
        let mut seen = HashSet::new();
        let mut volumes = Vec::new();

        for entry in self.volumes.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (id, root) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::MalformedEntry(entry.to_string()))?;
            let (id, root) = (id.trim(), root.trim());
            if root.is_empty() {
                return Err(ConfigError::MalformedEntry(entry.to_string()));
            }
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::InvalidId(id.to_string()));
            }
            if !seen.insert(id.to_string()) {
                return Err(ConfigError::DuplicateId(id.to_string()));
            }

            let root = fs::canonicalize(root).map_err(|e| ConfigError::Io(root.to_string(), e))?;
            if !root.is_dir() {
                return Err(ConfigError::NotADirectory {
                    id: id.to_string(),
                    root: root.display().to_string(),
                });
            }

            let alias = self.aliases.get(id).cloned();
            volumes.push(Volume::local(id, alias, root));
        }

        if volumes.is_empty() {
            return Err(ConfigError::NoVolumes);
        }
        Ok(volumes)
    }
}
