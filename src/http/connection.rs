use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::http::parser::{ParseError, parse_request};
use crate::http::request::HttpRequest;
use crate::http::response::Response;
use crate::http::static_files::StaticFiles;
use crate::http::stream::BufferedStream;
use crate::http::writer::ResponseWriter;

/// One accepted client, handled for exactly one request.
pub struct Connection {
    stream: BufferedStream<TcpStream>,
    peer: SocketAddr,
    files: Arc<StaticFiles>,
    request_timeout: Duration,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Serving(HttpRequest),
    Rejecting(ParseError),
    Closed,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        files: Arc<StaticFiles>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            stream: BufferedStream::new(stream),
            peer,
            files,
            request_timeout,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection from request head to close.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => self.read_request().await?,
                ConnectionState::Serving(req) => {
                    self.serve(&req).await;
                    ConnectionState::Closed
                }
                ConnectionState::Rejecting(err) => {
                    self.reject(err).await?;
                    ConnectionState::Closed
                }
                ConnectionState::Closed => break,
            };
        }

        // The peer may already be gone
        let _ = self.stream.get_mut().shutdown().await;
        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ConnectionState> {
        let parsed = match timeout(self.request_timeout, parse_request(&mut self.stream)).await {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(peer = %self.peer, "timed out waiting for request");
                return Ok(ConnectionState::Closed);
            }
        };

        match parsed {
            Ok(req) => Ok(ConnectionState::Serving(req)),
            Err(ParseError::Empty) => Ok(ConnectionState::Closed),
            Err(ParseError::Io(e)) => Err(e).context("reading request"),
            Err(e) => Ok(ConnectionState::Rejecting(e)),
        }
    }

    async fn serve(&mut self, req: &HttpRequest) {
        match self.files.serve(self.stream.get_mut(), req).await {
            Ok(status) => {
                tracing::info!(
                    peer = %self.peer,
                    status = status.as_u16(),
                    path = %req.path,
                    "{} {}",
                    req.method,
                    req.uri
                );
            }
            Err(e) => {
                tracing::debug!(
                    peer = %self.peer,
                    path = %req.path,
                    error = %e,
                    "response abandoned"
                );
            }
        }
    }

    async fn reject(&mut self, err: ParseError) -> anyhow::Result<()> {
        let response = Response::bad_request(&format!("{}.", err));
        ResponseWriter::new(&response)
            .write_to_stream(self.stream.get_mut())
            .await
            .context("writing error response")?;

        tracing::info!(
            peer = %self.peer,
            status = response.status.as_u16(),
            error = %err,
            "rejected request"
        );
        Ok(())
    }
}
