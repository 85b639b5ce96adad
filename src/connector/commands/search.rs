//! search

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;
use crate::connector::serializer;
use crate::storage::{FilesystemError, Target};

/// Name matcher for one search request.
///
/// The query is matched literally. `exact` requires the whole name to match,
/// otherwise any substring does; matching ignores case unless `case_sensitive`.
fn matcher(query: &str, exact: bool, case_sensitive: bool) -> Result<Regex, ConnectorError> {
    let escaped = regex::escape(query);
    let pattern = if exact {
        format!("^{}$", escaped)
    } else {
        escaped
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| ConnectorError::Internal(e.to_string()))
}

/// Depth-first walk below `folder`, collecting matching descendants
fn walk(
    ctx: &CaptureContext<'_>,
    folder: &Target,
    pattern: &Regex,
    found: &mut Vec<Value>,
) -> Result<(), FilesystemError> {
    for child in folder.list_children()? {
        let Some(meta) = child.stat()? else {
            continue;
        };
        if pattern.is_match(&child.name()) {
            match serializer::target_info(ctx.settings(), &child, &meta) {
                Ok(info) => found.push(info),
                Err(e) => log::warn!("Skipping {} in results: {}", child.path().display(), e),
            }
        }
        if meta.is_directory() {
            walk(ctx, &child, pattern, found)?;
        }
    }
    Ok(())
}

/// `search`: recursive name match across every readable volume
pub struct Search;

impl Command for Search {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let query = ctx.require("q")?;
        let pattern = matcher(query, ctx.flag("exact"), ctx.flag("case"))?;

        let mut found = Vec::new();
        for volume in ctx.volumes() {
            let root = volume.root();
            if !root.is_readable() {
                log::debug!("Volume {} is not readable, not searching it", volume.id());
                continue;
            }
            walk(ctx, &root, &pattern, &mut found)?;
        }
        log::debug!("Search for '{}' matched {} entries", query, found.len());

        let mut body = Map::new();
        body.insert("files".into(), Value::Array(found));
        Ok(Reply::Json(body))
    }
}
