use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::static_files::StaticFiles;

/// Bound listening socket plus everything a connection task needs.
pub struct Server {
    listener: TcpListener,
    files: Arc<StaticFiles>,
    request_timeout: Duration,
}

impl Server {
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let files = StaticFiles::new(&cfg.static_files).with_context(|| {
            format!("document root {}", cfg.static_files.root.display())
        })?;

        let addr = cfg.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {}", addr))?;

        Ok(Self {
            listener,
            files: Arc::new(files),
            request_timeout: cfg.request_timeout(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts forever, one task per connection.
    pub async fn serve(self) -> anyhow::Result<()> {
        info!(
            "Listening on {}, serving {}",
            self.local_addr()?,
            self.files.root().display()
        );

        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    // Transient (e.g. EMFILE), keep accepting
                    tracing::error!("accept failed: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            };
            tracing::debug!("Accepted connection from {}", peer);

            let files = self.files.clone();
            let request_timeout = self.request_timeout;
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, peer, files, request_timeout);
                if let Err(e) = conn.run().await {
                    tracing::warn!("Connection error from {}: {:#}", peer, e);
                }
            });
        }
    }
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    Server::bind(cfg).await?.serve().await
}
