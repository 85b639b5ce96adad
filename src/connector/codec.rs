//! Handle encoding
//!
//! A handle is `<volume id>_<escaped base64 of the relative path>`. Base64
//! characters that are awkward in URLs are swapped for two-character tokens
//! starting with `_`, which never occurs in standard base64 output.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::storage::{Target, Volume};

/// Escape tokens for reserved base64 characters
const ESCAPES: [(char, char); 5] = [('+', 'P'), ('-', 'M'), ('/', 'S'), ('.', 'D'), ('=', 'E')];

fn escape(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + 8);
    for c in encoded.chars() {
        match ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, token)) => {
                out.push('_');
                out.push(*token);
            }
            None => out.push(c),
        }
    }
    out
}

fn unescape(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '_' {
            out.push(c);
            continue;
        }
        let token = chars.next()?;
        let (raw, _) = ESCAPES.iter().find(|(_, t)| *t == token)?;
        out.push(*raw);
    }
    Some(out)
}

/// Encode a target as its opaque handle
pub fn encode(target: &Target) -> String {
    let relative = target.volume().relative_bytes(target.path());
    format!("{}_{}", target.volume().id(), escape(&BASE64.encode(relative)))
}

/// Handle of a volume's root
pub fn root_handle(volume: &Arc<Volume>) -> String {
    encode(&volume.root())
}

/// Decode a handle against the configured volumes.
///
/// Returns `None` for unknown volume ids, malformed payloads and paths that
/// would leave the volume root; none of these touch the filesystem.
pub fn decode(volumes: &[Arc<Volume>], handle: &str) -> Option<Target> {
    let (id, rest) = handle.split_once('_').unwrap_or((handle, ""));
    let volume = volumes.iter().find(|v| v.id() == id)?;

    if rest.is_empty() {
        return Some(volume.root());
    }

    let encoded = unescape(rest)?;
    let relative = BASE64.decode(encoded.as_bytes()).ok()?;

    match volume.from_relative_bytes(&relative) {
        Ok(target) => Some(target),
        Err(e) => {
            log::warn!("Rejected handle {} for volume {}: {}", handle, id, e);
            None
        }
    }
}
