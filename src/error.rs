//! Startup error types
//!
//! Per-request failures never surface here; they become HTTP status codes.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Fatal errors that abort server startup
#[derive(Debug)]
pub enum ServerError {
    /// Configuration could not be loaded or deserialized
    Config(config::ConfigError),
    /// `host:port` does not parse as a socket address
    InvalidAddress(String),
    /// Static root is missing or not a directory
    RootMissing { path: PathBuf, source: io::Error },
    /// Listener could not be bound
    Bind { addr: SocketAddr, source: io::Error },
    /// Log files could not be opened
    Logger(io::Error),
    /// Any other I/O failure (runtime creation, accept loop)
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::InvalidAddress(msg) => write!(f, "invalid address {msg}"),
            Self::RootMissing { path, source } => {
                write!(f, "static root '{}' is not usable: {source}", path.display())
            }
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            Self::Logger(e) => write!(f, "failed to open log file: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::InvalidAddress(_) => None,
            Self::RootMissing { source, .. } | Self::Bind { source, .. } => Some(source),
            Self::Logger(e) | Self::Io(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<io::Error> for ServerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
