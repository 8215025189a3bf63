//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! file and song handlers.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used types
pub use headers::{apply_server_header, apply_standard_headers, STANDARD_HEADERS};
pub use path::{PathError, RequestPath};
pub use response::{
    build_304_response, build_400_response, build_403_response, build_404_response,
    build_501_response, build_file_response, build_html_response, build_json_response,
    build_moved_permanently, build_options_response,
};
