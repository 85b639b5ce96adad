//! Request decoding: query strings, form bodies and raw uploads

use std::io::Read;

use tempfile::NamedTempFile;

use crate::connector::{ConnectorError, Params, UploadedFile};

/// Form field name reported for raw-body uploads
pub const UPLOAD_FIELD: &str = "upload[]";

/// Decode one `application/x-www-form-urlencoded` component (`+` is a space)
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Split `a=1&b=2&b=3` into decoded pairs, keeping repeats in order
pub fn parse_pairs(encoded: &str) -> Vec<(String, String)> {
    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Split a request URL into its path and query string
pub fn split_url(url: &str) -> (&str, &str) {
    url.split_once('?').unwrap_or((url, ""))
}

/// Path component of the configured connector URL
pub fn endpoint_path(connector_url: &str) -> &str {
    let without_scheme = match connector_url.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
        None => connector_url,
    };
    split_url(without_scheme).0
}

/// How the request body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    None,
    Form,
    Upload,
}

impl BodyKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("application/x-www-form-urlencoded") => BodyKind::Form,
            Some("application/octet-stream") => BodyKind::Upload,
            _ => BodyKind::None,
        }
    }
}

/// Decoded request ready for the connector
#[derive(Debug)]
pub struct DecodedRequest {
    pub params: Params,
    pub uploads: Vec<UploadedFile>,
    /// Holds upload bytes until the request is done
    _staged: Vec<NamedTempFile>,
}

/// Failure to decode a request
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Merge query string and body into parameters, staging raw uploads on disk
pub fn decode(query: &str, kind: BodyKind, body: &mut dyn Read) -> Result<DecodedRequest, RequestError> {
    let mut pairs = parse_pairs(query);
    let mut uploads = Vec::new();
    let mut staged = Vec::new();

    match kind {
        BodyKind::None => {}
        BodyKind::Form => {
            let mut text = String::new();
            body.read_to_string(&mut text)?;
            pairs.extend(parse_pairs(&text));
        }
        BodyKind::Upload => {
            let filename = pairs
                .iter()
                .find(|(k, _)| k == "filename")
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
                .ok_or(ConnectorError::MissingParameter("filename"))?;

            let mut file = NamedTempFile::new()?;
            let written = std::io::copy(body, file.as_file_mut())?;
            log::debug!("Staged upload '{}' ({} bytes) at {}", filename, written, file.path().display());
            uploads.push(UploadedFile {
                field_name: UPLOAD_FIELD.to_string(),
                original_filename: filename,
                path: file.path().to_path_buf(),
            });
            staged.push(file);
        }
    }

    Ok(DecodedRequest {
        params: pairs.into_iter().collect(),
        uploads,
        _staged: staged,
    })
}

/// `Content-Disposition` value for a file reply
pub fn content_disposition(name: &str, attachment: bool) -> String {
    let kind = if attachment { "attachment" } else { "inline" };
    format!("{}; filename*=UTF-8''{}", kind, urlencoding::encode(name))
}
