//! Process configuration.
//!
//! Defaults, optionally replaced by a YAML file named in `TINYSERVE_CONFIG`,
//! then overridden by positional command-line arguments:
//!
//! ```text
//! tinyserve                 # port 9999, current directory
//! tinyserve 8080            # port only
//! tinyserve /srv/www        # root only
//! tinyserve /srv/www 8080   # root and port
//! ```

use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an optional YAML configuration file.
pub const CONFIG_ENV: &str = "TINYSERVE_CONFIG";

pub const DEFAULT_PORT: u16 = 9999;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, without the port
    pub bind: String,
    pub port: u16,
    /// Upper bound on the time a client may take to send its request head
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Document root
    pub root: PathBuf,
    /// Render an index for directories instead of answering 404
    pub directory_listing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: 30,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            directory_listing: true,
        }
    }
}

impl Config {
    /// Loads the configuration from the environment and process arguments.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", PathBuf::from(&path).display()))?;
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };

        let args: Vec<String> = std::env::args().skip(1).collect();
        cfg.apply_args(&args)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid YAML configuration")
    }

    /// Applies positional arguments: `[port]`, `[root]` or `[root] [port]`.
    pub fn apply_args(&mut self, args: &[String]) -> anyhow::Result<()> {
        match args {
            [] => {}
            [one] if one.starts_with(|c: char| c.is_ascii_digit()) => {
                self.server.port = parse_port(one)?;
            }
            [one] => self.static_files.root = PathBuf::from(one),
            [root, port] => {
                self.static_files.root = PathBuf::from(root);
                self.server.port = parse_port(port)?;
            }
            _ => bail!("usage: tinyserve [root] [port]"),
        }
        Ok(())
    }

    /// Checks that the document root is an existing directory.
    pub fn validate(&self) -> anyhow::Result<()> {
        let root = &self.static_files.root;
        let meta = std::fs::metadata(root)
            .with_context(|| format!("document root {}", root.display()))?;
        if !meta.is_dir() {
            bail!("document root {} is not a directory", root.display());
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

fn parse_port(s: &str) -> anyhow::Result<u16> {
    s.parse().with_context(|| format!("invalid port {:?}", s))
}
