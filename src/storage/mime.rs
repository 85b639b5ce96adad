//! MIME type lookup for volume entries

use std::path::Path;

/// MIME type reported for every directory
pub const DIRECTORY_MIME: &str = "directory";

/// Fallback for files with no known extension
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Resolves a MIME type string for a file path
pub trait MimeResolver: Send + Sync {
    fn mime_type(&self, path: &Path) -> String;
}

/// Extension-table resolver used when nothing better is plugged in
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionMimeResolver;

impl MimeResolver for ExtensionMimeResolver {
    fn mime_type(&self, path: &Path) -> String {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return DEFAULT_MIME.to_string();
        };

        let mime = match ext.to_lowercase().as_str() {
            "txt" | "log" | "ini" | "cfg" | "conf" => "text/plain",
            "md" | "markdown" => "text/markdown",
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "csv" => "text/csv",
            "xml" => "text/xml",
            "js" | "mjs" => "text/javascript",
            "json" => "application/json",
            "rs" => "text/x-rust",
            "toml" => "application/toml",
            "yaml" | "yml" => "text/yaml",
            "sh" => "application/x-sh",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "webp" => "image/webp",
            "tif" | "tiff" => "image/tiff",
            "ico" => "image/x-icon",
            "svg" => "image/svg+xml",
            "pdf" => "application/pdf",
            "zip" => "application/zip",
            "gz" => "application/gzip",
            "tar" => "application/x-tar",
            "7z" => "application/x-7z-compressed",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            "mp4" => "video/mp4",
            "webm" => "video/webm",
            "mkv" => "video/x-matroska",
            "avi" => "video/x-msvideo",
            "iso" => "application/x-iso9660-image",
            _ => DEFAULT_MIME,
        };
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        let resolver = ExtensionMimeResolver;
        assert_eq!(resolver.mime_type(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(resolver.mime_type(Path::new("notes.txt")), "text/plain");
        assert_eq!(resolver.mime_type(Path::new("Makefile")), DEFAULT_MIME);
        assert_eq!(resolver.mime_type(Path::new("blob.unknown")), DEFAULT_MIME);
    }
}
