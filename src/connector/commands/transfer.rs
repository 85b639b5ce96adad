//! Commands that bring entries into a folder: paste, duplicate, upload

use std::sync::Arc;

use super::{incoming_destination, require_folder, unique_child, Changes};
use crate::connector::context::CaptureContext;
use crate::connector::dispatcher::{Command, Reply};
use crate::connector::error::ConnectorError;

/// `paste`: copy (or with `cut=1`, move) targets into the `dst` folder
pub struct Paste;

impl Command for Paste {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let dst = ctx.target("dst")?;
        require_folder(&dst)?;
        let sources = ctx.targets("targets[]")?;
        let cut = ctx.flag("cut");

        let mut changes = Changes::default();
        for src in &sources {
            if cut && src.is_root() {
                return Err(ConnectorError::Unsupported("moving a volume root"));
            }
            if src.metadata()?.is_directory() && src.contains(&dst) {
                return Err(ConnectorError::InvalidCopy(src.name()));
            }
            if cut && src.parent().as_ref() == Some(&dst) {
                log::debug!("{} is already in place", src.path().display());
                continue;
            }

            let dest = incoming_destination(ctx, &dst, &src.name(), Some(src), &mut changes)?;
            if cut && Arc::ptr_eq(src.volume(), dest.volume()) {
                src.rename(&dest)?;
            } else {
                src.copy_to(&dest)?;
                if cut {
                    src.delete_recursive()?;
                }
            }
            log::info!(
                "{} {} to {}",
                if cut { "Moved" } else { "Copied" },
                src.path().display(),
                dest.path().display()
            );

            changes.add(ctx, &dest)?;
            if cut {
                changes.remove(src);
            }
        }

        Ok(Reply::Json(changes.into_body()))
    }
}

/// `duplicate`: copy each target next to itself under a numbered name
pub struct Duplicate;

impl Command for Duplicate {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let sources = ctx.targets("targets[]")?;

        let mut changes = Changes::default();
        for src in &sources {
            let parent = src
                .parent()
                .ok_or(ConnectorError::Unsupported("duplicating a volume root"))?;
            let dest = unique_child(&parent, &src.name(), false)?;
            src.copy_to(&dest)?;
            log::info!("Duplicated {} as {}", src.path().display(), dest.name());
            changes.add(ctx, &dest)?;
        }

        Ok(Reply::Json(changes.into_body()))
    }
}

/// Last segment of a client-supplied file name (browsers may send full paths)
fn upload_name(original: &str) -> &str {
    original.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(original)
}

/// `upload`: move uploaded temp files into the target folder
pub struct Upload;

impl Command for Upload {
    fn execute(&self, ctx: &CaptureContext<'_>) -> Result<Reply, ConnectorError> {
        let dst = ctx.target("target")?;
        require_folder(&dst)?;
        if ctx.uploads().is_empty() {
            return Err(ConnectorError::MissingParameter("upload[]"));
        }

        let mut changes = Changes::default();
        for file in ctx.uploads() {
            let name = upload_name(&file.original_filename);
            let dest = incoming_destination(ctx, &dst, name, None, &mut changes)?;
            dest.import(&file.path)?;
            log::info!(
                "Stored upload '{}' ({}) as {}",
                file.original_filename,
                file.field_name,
                dest.path().display()
            );
            changes.add(ctx, &dest)?;
        }

        Ok(Reply::Json(changes.into_body()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::commands::testing::{names, Fixture};
    use crate::connector::context::{Params, UploadedFile};
    use tempfile::TempDir;

    #[test]
    fn test_paste_copy_keeps_source() {
        let fx = Fixture::new();
        fx.write("a.txt", b"A");
        fx.mkdir("dest");

        let body = fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.handle("dest"))
                .with("targets[]", fx.handle("a.txt")),
        );

        assert_eq!(body["added"][0]["hash"], fx.handle("dest/a.txt").as_str());
        assert!(body["removed"].as_array().unwrap().is_empty());
        assert!(fx.exists("a.txt"));
        assert!(fx.exists("dest/a.txt"));
    }

    #[test]
    fn test_paste_cut_moves_source() {
        let fx = Fixture::new();
        fx.write("a.txt", b"A");
        fx.mkdir("dest");
        let source = fx.handle("a.txt");

        let body = fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.handle("dest"))
                .with("targets[]", source.clone())
                .with("cut", "1"),
        );

        assert_eq!(body["removed"][0], source.as_str());
        assert!(!fx.exists("a.txt"));
        assert_eq!(std::fs::read(fx.dir.path().join("dest/a.txt")).unwrap(), b"A");
    }

    #[test]
    fn test_paste_cut_other_value_copies() {
        let fx = Fixture::new();
        fx.write("a.txt", b"A");
        fx.mkdir("dest");

        fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.handle("dest"))
                .with("targets[]", fx.handle("a.txt"))
                .with("cut", "true"),
        );
        assert!(fx.exists("a.txt"));
        assert!(fx.exists("dest/a.txt"));
    }

    #[test]
    fn test_paste_folder_recursively_and_into_itself() {
        let fx = Fixture::new();
        fx.write("src/inner/deep.txt", b"deep");
        fx.mkdir("dest");

        let body = fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.handle("dest"))
                .with("targets[]", fx.handle("src")),
        );
        assert_eq!(names(&body["added"]), ["src"]);
        assert!(fx.exists("dest/src/inner/deep.txt"));

        let body = fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.handle("src/inner"))
                .with("targets[]", fx.handle("src")),
        );
        assert_eq!(body["error"], "cannot copy src into itself");
    }

    #[test]
    fn test_paste_into_same_folder_picks_free_name() {
        let fx = Fixture::new();
        fx.write("a.txt", b"A");

        let body = fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.root_handle())
                .with("targets[]", fx.handle("a.txt")),
        );
        assert_eq!(names(&body["added"]), ["a(1).txt"]);
    }

    #[test]
    fn test_paste_renames_existing_when_requested() {
        let fx = Fixture::new();
        fx.write("a.txt", b"new");
        fx.write("dest/a.txt", b"old");

        let body = fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.handle("dest"))
                .with("targets[]", fx.handle("a.txt"))
                .with("renames[]", "a.txt"),
        );

        assert_eq!(names(&body["added"]), ["a(1).txt", "a.txt"]);
        assert_eq!(std::fs::read(fx.dir.path().join("dest/a.txt")).unwrap(), b"new");
        assert_eq!(std::fs::read(fx.dir.path().join("dest/a(1).txt")).unwrap(), b"old");
    }

    #[test]
    fn test_paste_into_own_folder_with_renames_keeps_source() {
        let fx = Fixture::new();
        fx.write("a.txt", b"A");

        let body = fx.run(
            Params::new()
                .with("cmd", "paste")
                .with("dst", fx.root_handle())
                .with("targets[]", fx.handle("a.txt"))
                .with("renames[]", "a.txt"),
        );

        assert!(body.get("error").is_none());
        assert_eq!(names(&body["added"]), ["a(1).txt"]);
        assert_eq!(std::fs::read(fx.dir.path().join("a.txt")).unwrap(), b"A");
        assert_eq!(std::fs::read(fx.dir.path().join("a(1).txt")).unwrap(), b"A");
    }

    #[test]
    fn test_duplicate_twice() {
        let fx = Fixture::new();
        fx.write("name.ext", b"data");
        let params = Params::new()
            .with("cmd", "duplicate")
            .with("targets[]", fx.handle("name.ext"));

        let first = fx.run(params.clone());
        assert_eq!(names(&first["added"]), ["name(1).ext"]);
        let second = fx.run(params);
        assert_eq!(names(&second["added"]), ["name(2).ext"]);
        assert_eq!(std::fs::read(fx.dir.path().join("name(2).ext")).unwrap(), b"data");
    }

    #[test]
    fn test_duplicate_skips_unrelated_existing_copy() {
        let fx = Fixture::new();
        fx.write("name.ext", b"data");
        fx.write("name(1).ext", b"uploaded earlier");
        let params = Params::new()
            .with("cmd", "duplicate")
            .with("targets[]", fx.handle("name.ext"));

        assert_eq!(names(&fx.run(params.clone())["added"]), ["name(2).ext"]);
        assert_eq!(names(&fx.run(params)["added"]), ["name(3).ext"]);
        assert_eq!(
            std::fs::read(fx.dir.path().join("name(1).ext")).unwrap(),
            b"uploaded earlier"
        );
    }

    #[test]
    fn test_duplicate_of_copy_restarts_numbering() {
        let fx = Fixture::new();
        fx.write("name(4).ext", b"data");
        let body = fx.run(
            Params::new()
                .with("cmd", "duplicate")
                .with("targets[]", fx.handle("name(4).ext")),
        );
        assert_eq!(names(&body["added"]), ["name(1).ext"]);
    }

    fn staged(dir: &TempDir, file: &str, data: &[u8], original: &str) -> UploadedFile {
        let path = dir.path().join(file);
        std::fs::write(&path, data).unwrap();
        UploadedFile {
            field_name: "upload[]".to_string(),
            original_filename: original.to_string(),
            path,
        }
    }

    #[test]
    fn test_upload_collision_gets_numbered_name() {
        let fx = Fixture::new();
        let staging = TempDir::new().unwrap();
        fx.write("photo.jpg", b"existing");

        let uploads = vec![
            staged(&staging, "t1", b"one", "photo.jpg"),
            staged(&staging, "t2", b"two", "C:\\Users\\me\\notes.txt"),
        ];
        let body = fx.run_with_uploads(
            Params::new().with("cmd", "upload").with("target", fx.root_handle()),
            &uploads,
        );

        assert_eq!(names(&body["added"]), ["photo(1).jpg", "notes.txt"]);
        assert_eq!(std::fs::read(fx.dir.path().join("photo.jpg")).unwrap(), b"existing");
        assert_eq!(std::fs::read(fx.dir.path().join("photo(1).jpg")).unwrap(), b"one");
        assert!(!staging.path().join("t1").exists());
    }

    #[test]
    fn test_upload_without_files_fails() {
        let fx = Fixture::new();
        let body = fx.run(Params::new().with("cmd", "upload").with("target", fx.root_handle()));
        assert_eq!(body["error"], "missing parameter: upload[]");
    }

    #[test]
    fn test_upload_name() {
        assert_eq!(upload_name("a/b/c.txt"), "c.txt");
        assert_eq!(upload_name("C:\\x\\y.png"), "y.png");
        assert_eq!(upload_name("plain"), "plain");
    }
}
