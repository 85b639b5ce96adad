//! Browsing commands: open, ls, tree, parents

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::{infos, require_folder};
use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;
use crate::connector::serializer;
use crate::storage::Target;

/// Protocol version reported on `init`
const API_VERSION: &str = "2.1";

/// Info objects keyed by hash so a listing never repeats an entry
#[derive(Default)]
struct Listing {
    seen: HashSet<String>,
    files: Vec<Value>,
}

impl Listing {
    fn push(&mut self, info: Value) {
        let hash = info["hash"].as_str().unwrap_or_default().to_string();
        if self.seen.insert(hash) {
            self.files.push(info);
        }
    }

    fn extend(&mut self, infos: Vec<Value>) {
        for info in infos {
            self.push(info);
        }
    }
}

/// Depth-first collection of `folder` and every folder below it
fn collect_folders(folder: &Target, out: &mut Vec<Target>) -> Result<(), ConnectorError> {
    out.push(folder.clone());
    for (child, _) in folder.child_folders()? {
        collect_folders(&child, out)?;
    }
    Ok(())
}

/// The requested folder, or the first volume root when it is absent or unusable
fn working_directory(ctx: &CaptureContext<'_>) -> Result<Target, ConnectorError> {
    if let Some(target) = ctx.optional_target("target") {
        if target.is_folder()? {
            return Ok(target);
        }
        log::debug!("open target {} is not a folder, using default root", target.path().display());
    }
    ctx.default_root()
        .ok_or_else(|| ConnectorError::NotFound("no volumes configured".to_string()))
}

/// `open`: working directory, its children, and optionally every folder of every volume
pub struct Open;

impl Command for Open {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let settings = ctx.settings();
        let mut listing = Listing::default();

        if ctx.is_set("tree") {
            let mut folders = Vec::new();
            for volume in ctx.volumes() {
                collect_folders(&volume.root(), &mut folders)?;
            }
            listing.extend(infos(ctx, &folders)?);
        }

        let cwd = working_directory(ctx)?;
        let cwd_info = serializer::info(settings, &cwd)?;
        listing.push(cwd_info.clone());
        listing.extend(infos(ctx, &cwd.list_children()?)?);

        let mut body = Map::new();
        body.insert("cwd".into(), cwd_info);
        body.insert("files".into(), Value::Array(listing.files));
        body.insert("options".into(), serializer::options(settings, &cwd));

        if ctx.is_set("init") {
            body.insert("api".into(), Value::from(API_VERSION));
            body.insert("uplMaxSize".into(), Value::from(settings.upload_max_size.clone()));
            body.insert("netDrivers".into(), json!([]));
        }

        Ok(Reply::Json(body))
    }
}

/// `ls`: immediate children of a folder
pub struct Ls;

impl Command for Ls {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let folder = match ctx.optional_target("target") {
            Some(target) => target,
            None => ctx
                .default_root()
                .ok_or_else(|| ConnectorError::NotFound("no volumes configured".to_string()))?,
        };

        let children = infos(ctx, &folder.list_children()?)?;
        let mut list = Map::new();
        for info in &children {
            if let Some(hash) = info["hash"].as_str() {
                list.insert(hash.to_string(), info.clone());
            }
        }

        let mut body = Map::new();
        body.insert("list".into(), Value::Object(list));
        body.insert("files".into(), Value::Array(children));
        Ok(Reply::Json(body))
    }
}

/// `tree`: a folder and its child folders
pub struct Tree;

impl Command for Tree {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let folder = ctx.target("target")?;
        require_folder(&folder)?;

        let mut listing = Listing::default();
        listing.push(serializer::info(ctx.settings(), &folder)?);
        for (child, meta) in folder.child_folders()? {
            listing.push(serializer::target_info(ctx.settings(), &child, &meta)?);
        }

        let mut body = Map::new();
        body.insert("tree".into(), Value::Array(listing.files));
        Ok(Reply::Json(body))
    }
}

/// `parents`: every ancestor of a folder up to its root, each with its child folders
pub struct Parents;

impl Command for Parents {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let folder = ctx.target("target")?;
        let mut listing = Listing::default();

        let mut current = Some(folder);
        while let Some(dir) = current {
            listing.push(serializer::info(ctx.settings(), &dir)?);
            for (child, meta) in dir.child_folders()? {
                listing.push(serializer::target_info(ctx.settings(), &child, &meta)?);
            }
            current = dir.parent();
        }

        let mut body = Map::new();
        body.insert("tree".into(), Value::Array(listing.files));
        Ok(Reply::Json(body))
    }
}

#[cfg(test)]
mod tests {
    use crate::connector::commands::testing::{names, Fixture};
    use crate::connector::context::Params;

    #[test]
    fn test_open_defaults_to_first_root() {
        let fx = Fixture::new();
        fx.write("a.txt", b"x");
        fx.mkdir("sub");

        let body = fx.run(Params::new().with("cmd", "open").with("init", "1"));
        assert_eq!(body["cwd"]["hash"], fx.root_handle().as_str());
        assert_eq!(names(&body["files"]), ["ROOT", "a.txt", "sub"]);
        assert_eq!(body["api"], "2.1");
        assert_eq!(body["options"]["separator"], "/");
    }

    #[test]
    fn test_open_unresolved_target_falls_back() {
        let fx = Fixture::new();
        let body = fx.run(Params::new().with("cmd", "open").with("target", "NOPE_abc"));
        assert_eq!(body["cwd"]["hash"], fx.root_handle().as_str());
        assert!(body.get("api").is_none());
    }

    #[test]
    fn test_open_tree_collects_all_folders() {
        let fx = Fixture::new();
        fx.mkdir("a/b");
        fx.mkdir("c");
        fx.write("a/file.txt", b"");

        let body = fx.run(
            Params::new()
                .with("cmd", "open")
                .with("tree", "1")
                .with("target", fx.handle("a")),
        );
        assert_eq!(body["cwd"]["name"], "a");
        // folders depth-first, then cwd (already listed) and its children
        assert_eq!(names(&body["files"]), ["ROOT", "a", "b", "c", "file.txt"]);
    }

    #[test]
    fn test_ls_lists_children() {
        let fx = Fixture::new();
        fx.write("one.txt", b"1");
        fx.write("two.txt", b"2");

        let body = fx.run(Params::new().with("cmd", "ls").with("target", fx.root_handle()));
        assert_eq!(names(&body["files"]), ["one.txt", "two.txt"]);
        let list = body["list"].as_object().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[&fx.handle("one.txt")]["name"], "one.txt");
    }

    #[test]
    fn test_ls_on_file_fails() {
        let fx = Fixture::new();
        fx.write("one.txt", b"1");
        let body = fx.run(Params::new().with("cmd", "ls").with("target", fx.handle("one.txt")));
        assert!(body["error"].as_str().unwrap().starts_with("Not a directory"));
    }

    #[test]
    fn test_tree_and_parents() {
        let fx = Fixture::new();
        fx.mkdir("a/b/c");
        fx.mkdir("x");

        let body = fx.run(Params::new().with("cmd", "tree").with("target", fx.handle("a")));
        assert_eq!(names(&body["tree"]), ["a", "b"]);

        let body = fx.run(Params::new().with("cmd", "parents").with("target", fx.handle("a/b")));
        assert_eq!(names(&body["tree"]), ["b", "c", "a", "ROOT", "x"]);
    }
}
