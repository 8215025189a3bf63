//! Conditional request support
//!
//! `Last-Modified` formatting and `If-Modified-Since` evaluation.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format a timestamp as an HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    let utc: DateTime<Utc> = time.into();
    utc.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Check whether the client's copy is still current
///
/// Returns true (respond 304) when `If-Modified-Since` parses and the file
/// was not modified after it, compared at whole-second precision.
/// Unparseable dates are ignored.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(header) = if_modified_since else {
        return false;
    };
    let Ok(since) = DateTime::parse_from_rfc2822(header.trim()) else {
        return false;
    };
    let modified: DateTime<Utc> = modified.into();
    modified.timestamp() <= since.timestamp()
}
