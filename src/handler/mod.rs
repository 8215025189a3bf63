//! Request handler module
//!
//! Responsible for request routing dispatch and the two content sources:
//! static files under the root and the JSON song listing.

pub mod listing;
pub mod router;
pub mod songs;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
