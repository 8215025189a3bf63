//! Static asset server with permissive CORS and no-cache headers.
//!
//! Serves files from a root directory, answers OPTIONS preflights with an
//! empty 200, and lists the subdirectories of `<root>/songs` as JSON on
//! `GET /songs/`.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::ServerError;
