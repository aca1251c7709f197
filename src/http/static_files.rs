//! Range-aware static file responses.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::net::TcpStream;

use crate::config::StaticFilesConfig;
use crate::http::directory;
use crate::http::mime;
use crate::http::request::HttpRequest;
use crate::http::response::{Response, StatusCode};
use crate::http::transfer;
use crate::http::writer::ResponseWriter;

/// Serves files below a document root.
///
/// Shared read-only between all connections.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    directory_listing: bool,
}

impl StaticFiles {
    /// Canonicalizes the configured root. Fails if it does not exist.
    pub fn new(config: &StaticFilesConfig) -> io::Result<Self> {
        Ok(Self {
            root: std::fs::canonicalize(&config.root)?,
            directory_listing: config.directory_listing,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Answers `request` on `stream` and returns the status that was sent.
    ///
    /// An `Err` means the response was cut short while writing; nothing more
    /// may be sent on the connection.
    pub async fn serve(&self, stream: &mut TcpStream, request: &HttpRequest) -> io::Result<StatusCode> {
        let Some(path) = self.locate(&request.path).await else {
            return send(stream, &Response::not_found()).await;
        };

        // Stat before opening: a read-only open of a FIFO blocks until a writer shows up
        let meta = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "stat failed");
                return send(stream, &Response::internal_error()).await;
            }
        };

        if meta.is_dir() {
            return self.serve_directory(stream, &path, request).await;
        }

        if !meta.is_file() {
            return send(stream, &Response::bad_request("Unknown Error.")).await;
        }

        let mut file = match File::open(&path).await {
            Ok(f) => f,
            Err(_) => return send(stream, &Response::not_found()).await,
        };

        let total = meta.len();
        let Some((start, end)) = request.span(total) else {
            return send(stream, &Response::range_not_satisfiable(total)).await;
        };

        let partial = request.range.is_some();
        let head = Response::file_head(partial, start, end, total, mime::resolve(&request.path));
        ResponseWriter::new(&head).write_to_stream(stream).await?;

        let sent = transfer::send_range(stream, &mut file, start, end).await?;
        if sent < end - start {
            tracing::debug!(
                path = %request.path,
                sent,
                expected = end - start,
                "file ended before the announced length"
            );
        }

        Ok(head.status)
    }

    async fn serve_directory(
        &self,
        stream: &mut TcpStream,
        path: &Path,
        request: &HttpRequest,
    ) -> io::Result<StatusCode> {
        if !self.directory_listing {
            return send(stream, &Response::not_found()).await;
        }

        match directory::render_listing(path, &request.path).await {
            Ok(html) => send(stream, &Response::html(html)).await,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "directory listing failed");
                send(stream, &Response::internal_error()).await
            }
        }
    }

    /// Maps a sanitized request path onto the filesystem.
    ///
    /// Returns `None` when the target does not exist or resolves, through a
    /// symlink, to somewhere outside the root.
    async fn locate(&self, relative: &str) -> Option<PathBuf> {
        let candidate = self.root.join(relative);
        let resolved = tokio::fs::canonicalize(&candidate).await.ok()?;

        if !resolved.starts_with(&self.root) {
            tracing::warn!(
                path = relative,
                resolved = %resolved.display(),
                "blocked path outside document root"
            );
            return None;
        }

        Some(resolved)
    }
}

async fn send(stream: &mut TcpStream, response: &Response) -> io::Result<StatusCode> {
    ResponseWriter::new(response).write_to_stream(stream).await?;
    Ok(response.status)
}
