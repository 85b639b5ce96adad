//! JSON shapes for targets and the options block

use serde_json::{json, Map, Value};

use super::codec;
use super::context::ConnectorSettings;
use super::error::ConnectorError;
use crate::storage::{EntryMetadata, Target};

/// Wire encoding of a boolean flag
fn flag(value: bool) -> Value {
    Value::from(if value { 1 } else { 0 })
}

/// Info object for a target whose metadata is already resolved
pub fn target_info(
    settings: &ConnectorSettings,
    target: &Target,
    meta: &EntryMetadata,
) -> Result<Value, ConnectorError> {
    let hash = codec::encode(target);
    let mime = target.mime_type(meta);

    let mut info = Map::new();
    info.insert("hash".into(), Value::from(hash.clone()));
    info.insert("mime".into(), Value::from(mime.clone()));
    info.insert("ts".into(), Value::from(meta.timestamp()));
    info.insert("size".into(), Value::from(meta.size));
    // Permissions are not enforced yet; every entry is readable and writable
    info.insert("read".into(), flag(true));
    info.insert("write".into(), flag(true));
    info.insert("locked".into(), flag(false));

    if mime.starts_with("image") {
        info.insert(
            "tmb".into(),
            Value::from(format!("{}?cmd=file&target={}", settings.connector_url, hash)),
        );
    }

    if target.is_root() {
        info.insert("name".into(), Value::from(target.volume().alias()));
        info.insert("volumeid".into(), Value::from(format!("{}_", target.volume().id())));
    } else {
        info.insert("name".into(), Value::from(target.name()));
        if let Some(parent) = target.parent() {
            info.insert("phash".into(), Value::from(codec::encode(&parent)));
        }
    }

    if meta.is_directory() {
        info.insert("dirs".into(), flag(target.has_child_folder()?));
    }

    Ok(Value::Object(info))
}

/// Info object for a target, fetching its metadata first
pub fn info(settings: &ConnectorSettings, target: &Target) -> Result<Value, ConnectorError> {
    let meta = target.metadata()?;
    target_info(settings, target, &meta)
}

/// Capability block describing a working directory
pub fn options(settings: &ConnectorSettings, cwd: &Target) -> Value {
    json!({
        "path": cwd.label(),
        "url": "",
        "tmbUrl": "",
        "disabled": settings.disabled,
        "separator": "/",
        // incoming entries never replace existing ones; they get an `(n)` name
        "copyOverwrite": 0,
        "uploadOverwrite": 0,
        "archivers": {
            "create": [],
            "extract": [],
        },
    })
}
