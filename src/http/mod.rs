//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one `GET`-style request per
//! connection, an optional single byte range, and a file or directory
//! listing in response.
//!
//! # Architecture
//!
//! - **`stream`**: buffered, line-oriented reads over the raw socket
//! - **`parser`**: request line, `Range` header and request-target decoding
//! - **`request`**: the parsed request and its byte range
//! - **`mime`**: content type from file extension
//! - **`response`**: status codes and response heads
//! - **`writer`**: serializes and writes responses
//! - **`transfer`**: moves file bytes to the socket (`sendfile` on Linux)
//! - **`static_files`**: decides the status and streams the file
//! - **`directory`**: HTML index for directories
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read the request head
//!        └──────┬──────┘
//!               │
//!       ┌───────┴────────┐
//!       │ parsed         │ malformed
//!       ▼                ▼
//!  ┌──────────┐    ┌───────────┐
//!  │ Serving  │    │ Rejecting │ ← 400
//!  └────┬─────┘    └─────┬─────┘
//!       └───────┬────────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Closed    │
//!        └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tinyserve::config::Config;
//! use tinyserve::http::connection::Connection;
//! use tinyserve::http::static_files::StaticFiles;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let files = Arc::new(StaticFiles::new(&cfg.static_files)?);
//!     let listener = TcpListener::bind("127.0.0.1:9999").await?;
//!     let request_timeout = cfg.request_timeout();
//!
//!     loop {
//!         let (socket, peer) = listener.accept().await?;
//!         let files = files.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, peer, files, request_timeout);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod directory;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod static_files;
pub mod stream;
pub mod transfer;
pub mod writer;
