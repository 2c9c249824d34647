//! Local HTTP server for a built site.
//!
//! Serves files from one directory with `tiny_http`. Resolution order for a
//! request path:
//!
//! 1. Exact file match → the file
//! 2. Directory with `index.html` → that file
//! 3. Directory with `index.htm` → that file
//! 4. Anything else, including paths that try to leave the root → 404
//!
//! The server is single-threaded and blocks until the process is stopped.

use std::fs;
use std::io::{self, Cursor};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Index files tried, in order, when a directory is requested.
pub const INDEX_FILES: &[&str] = &["index.html", "index.htm"];

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("directory to serve does not exist: {0}")]
    RootMissing(PathBuf),
    #[error("failed to bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },
}

/// Map a request URL onto a file below `root`.
///
/// The URL is percent-decoded and its query string dropped. Returns `None`
/// when nothing servable exists or a segment would escape `root`.
pub fn resolve_request_path(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path).ok()?;

    let mut local = root.to_path_buf();
    for segment in decoded.split('/').filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => local.push(part),
            (Some(Component::CurDir), None) => {}
            _ => return None,
        }
    }

    if local.is_file() {
        return Some(local);
    }
    if local.is_dir() {
        return INDEX_FILES
            .iter()
            .map(|name| local.join(name))
            .find(|p| p.is_file());
    }
    None
}

/// Guess the MIME type from the file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Bind `0.0.0.0:port` and serve `root` until the process exits.
///
/// `on_ready` is called with the bound address once the socket is open.
pub fn serve(root: &Path, port: u16, on_ready: impl FnOnce(SocketAddr)) -> Result<(), ServeError> {
    if !root.is_dir() {
        return Err(ServeError::RootMissing(root.to_path_buf()));
    }
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let server = Server::http(addr).map_err(|e| ServeError::Bind {
        addr,
        message: e.to_string(),
    })?;
    on_ready(addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root) {
            eprintln!("request error: {e}");
        }
    }
    Ok(())
}

fn handle_request(request: Request, root: &Path) -> io::Result<()> {
    match resolve_request_path(root, request.url()) {
        Some(path) => {
            let content = fs::read(&path)?;
            let response = Response::from_data(content).with_header(header(content_type(&path))?);
            request.respond(response)
        }
        None => {
            let body = "404 Not Found";
            let response = Response::new(
                StatusCode(404),
                vec![header("text/plain; charset=utf-8")?],
                Cursor::new(body),
                Some(body.len()),
                None,
            );
            request.respond(response)
        }
    }
}

fn header(content_type: &str) -> io::Result<Header> {
    Header::from_bytes("Content-Type", content_type)
        .map_err(|()| io::Error::new(io::ErrorKind::InvalidInput, "invalid header value"))
}
