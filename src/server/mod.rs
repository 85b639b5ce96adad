//! HTTP front end
//!
//! A fixed pool of worker threads shares one `tiny_http` server. Every request
//! to the connector endpoint is decoded into parameters and handed to the
//! [`Connector`]; each command runs to completion on its worker.

pub mod request;

use std::sync::Arc;
use std::thread;

use serde_json::Value;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server};

use crate::connector::{Connector, Reply};
use request::{BodyKind, RequestError};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {0}: {1}")]
    Bind(String, String),

    #[error("Worker thread failed: {0}")]
    Worker(#[from] std::io::Error),
}

/// Serve `connector` on `bind` until the listener fails
pub fn serve(connector: Connector, bind: &str, workers: usize) -> Result<(), ServerError> {
    let server = Server::http(bind).map_err(|e| ServerError::Bind(bind.to_string(), e.to_string()))?;
    let server = Arc::new(server);
    let connector = Arc::new(connector);
    let endpoint = request::endpoint_path(&connector.settings().connector_url).to_string();
    log::info!("Listening on http://{}{} with {} workers", bind, endpoint, workers.max(1));

    let mut handles = Vec::new();
    for id in 0..workers.max(1) {
        let server = Arc::clone(&server);
        let connector = Arc::clone(&connector);
        let endpoint = endpoint.clone();
        let handle = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || worker_loop(&server, &connector, &endpoint))?;
        handles.push(handle);
    }

    for handle in handles {
        if handle.join().is_err() {
            log::error!("A worker thread panicked");
        }
    }
    Ok(())
}

fn worker_loop(server: &Server, connector: &Connector, endpoint: &str) {
    loop {
        match server.recv() {
            Ok(request) => handle_request(connector, endpoint, request),
            Err(e) => {
                log::error!("Failed to receive request: {}", e);
                break;
            }
        }
    }
}

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn header_value<'a>(request: &'a Request, name: &'static str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn json_response(body: &Value, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    let data = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    let mut response = Response::from_data(data).with_status_code(status);
    if let Some(h) = header("Content-Type", JSON_CONTENT_TYPE) {
        response.add_header(h);
    }
    response
}

fn reply_response(reply: Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    match reply {
        Reply::Json(body) => json_response(&Value::Object(body), 200),
        Reply::File(file) => {
            let mut response = Response::from_data(file.data);
            if let Some(h) = header("Content-Type", &file.mime) {
                response.add_header(h);
            }
            let disposition = request::content_disposition(&file.name, file.attachment);
            if let Some(h) = header("Content-Disposition", &disposition) {
                response.add_header(h);
            }
            response
        }
    }
}

fn handle_request(connector: &Connector, endpoint: &str, mut request: Request) {
    let url = request.url().to_string();
    let (path, query) = request::split_url(&url);
    log::debug!("{} {}", request.method(), path);

    let response = if path != endpoint {
        json_response(&serde_json::json!({ "error": "not found" }), 404)
    } else {
        let kind = BodyKind::from_content_type(header_value(&request, "Content-Type"));
        match request::decode(query, kind, request.as_reader()) {
            Ok(decoded) => reply_response(connector.handle(&decoded.params, &decoded.uploads)),
            Err(RequestError::Connector(e)) => reply_response(Reply::error(&e)),
            Err(RequestError::Io(e)) => {
                log::warn!("Failed to read request body: {}", e);
                json_response(&serde_json::json!({ "error": e.to_string() }), 400)
            }
        }
    };

    if let Err(e) = request.respond(response) {
        log::warn!("Failed to send response: {}", e);
    }
}
