//! Server configuration.
//!
//! Every setting can come from a CLI flag or an environment variable
//! (flag wins), falling back to a compiled default.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::store::ReadPolicy;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_FILE: &str = "data/tasks.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address {host}:{port}: {source}")]
    InvalidAddr {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    #[error("listen address {host}:{port} resolved to nothing")]
    Unresolved { host: String, port: u16 },
}

/// CLI arguments for the TaskFlow server.
#[derive(clap::Parser, Debug)]
#[command(version, about = "TaskFlow task tracker backend")]
pub struct CliArgs {
    /// Interface to listen on: an IP address or a resolvable host name.
    #[arg(long, env = "TASKFLOW_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// JSON file holding the task list. Created with seed data if missing.
    #[arg(long, env = "TASKFLOW_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Directory of a built front-end to serve for non-API paths.
    #[arg(long, env = "TASKFLOW_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Fail requests when the task file is unreadable instead of treating it as empty.
    #[arg(long, env = "TASKFLOW_STRICT_READS")]
    pub strict_reads: bool,

    /// Log level filter (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[arg(long, env = "TASKFLOW_LOG", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub read_policy: ReadPolicy,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            static_dir: None,
            read_policy: ReadPolicy::Lenient,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_cli(cli: &CliArgs) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            data_file: cli.data_file.clone(),
            static_dir: cli.static_dir.clone(),
            read_policy: if cli.strict_reads {
                ReadPolicy::Strict
            } else {
                ReadPolicy::Lenient
            },
            log_level: cli.log_level.clone(),
        }
    }

    /// Resolve `host:port` to the first socket address, so names like
    /// `localhost` work as well as IP literals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddr`] if the lookup fails and
    /// [`ConfigError::Unresolved`] if it yields no address.
    pub async fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|source| ConfigError::InvalidAddr {
                host: self.host.clone(),
                port: self.port,
                source,
            })?;
        addrs.next().ok_or_else(|| ConfigError::Unresolved {
            host: self.host.clone(),
            port: self.port,
        })
    }
}
