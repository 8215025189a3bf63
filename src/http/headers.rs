//! Standard response headers
//!
//! Every response leaving the server carries the same CORS and no-cache
//! headers, appended after whatever the handler already set.

use hyper::header::{HeaderName, HeaderValue};
use hyper::Response;

/// CORS and no-cache headers, in emission order
pub const STANDARD_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    ("cache-control", "no-cache, no-store, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

/// Append the standard headers to a response.
///
/// Existing values are left untouched; if a handler already set
/// `Cache-Control`, the response ends up with both values.
pub fn apply_standard_headers<B>(response: &mut Response<B>) {
    let headers = response.headers_mut();
    for (name, value) in STANDARD_HEADERS {
        headers.append(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

/// Set the `Server` header if the configured name is a valid header value
pub fn apply_server_header<B>(response: &mut Response<B>, server_name: &str) {
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(hyper::header::SERVER, value);
    }
}
