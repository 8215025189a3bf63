//! Static file serving module
//!
//! Maps a normalized request path onto the static root, then loads the file
//! and builds the response. Every candidate is canonicalized and must stay
//! under the canonical root, symlinks included.

use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, PathError, RequestPath};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Outcome of mapping a request path onto the root
#[derive(Debug)]
pub enum Lookup {
    /// Regular file to send
    File { path: PathBuf, metadata: Metadata },
    /// Directory without an index file
    Listing { dir: PathBuf },
    /// Directory requested without trailing slash
    Redirect { location: String },
    NotFound,
    Forbidden,
    BadRequest,
}

/// Serve a GET/HEAD request from the static root
pub async fn serve(
    ctx: &RequestContext<'_>,
    root: &Path,
    index_files: &[String],
    listing_enabled: bool,
) -> Response<Full<Bytes>> {
    match lookup(root, ctx.path, ctx.query, index_files).await {
        Lookup::File { path, metadata } => serve_file(ctx, &path, &metadata).await,
        Lookup::Listing { dir } if listing_enabled => serve_listing(ctx, &dir).await,
        Lookup::Listing { .. } | Lookup::NotFound => http::build_404_response(),
        Lookup::Redirect { location } => http::build_moved_permanently(&location),
        Lookup::Forbidden => http::build_403_response(),
        Lookup::BadRequest => http::build_400_response(),
    }
}

/// Resolve `raw_path` (undecoded URI path) against the canonical `root`
pub async fn lookup(
    root: &Path,
    raw_path: &str,
    query: Option<&str>,
    index_files: &[String],
) -> Lookup {
    let request_path = match RequestPath::parse(raw_path) {
        Ok(p) => p,
        Err(PathError::Malformed) => return Lookup::BadRequest,
        Err(PathError::Traversal) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {raw_path}"));
            return Lookup::Forbidden;
        }
    };

    let candidate = request_path
        .segments
        .iter()
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment));

    // File not found is common (404), no need to log at warning level
    let (canonical, metadata) = match resolve_within(root, &candidate, raw_path).await {
        Some(Resolved::Inside(path, metadata)) => (path, metadata),
        Some(Resolved::Outside) => return Lookup::Forbidden,
        None => return Lookup::NotFound,
    };

    if metadata.is_dir() {
        if !request_path.trailing_slash && !request_path.is_root() {
            let href = request_path.directory_href();
            let location = match query {
                Some(q) => format!("{href}?{q}"),
                None => href,
            };
            return Lookup::Redirect { location };
        }

        for index_file in index_files {
            let index_path = canonical.join(index_file);
            if let Some(Resolved::Inside(path, metadata)) =
                resolve_within(root, &index_path, raw_path).await
            {
                if metadata.is_file() {
                    return Lookup::File { path, metadata };
                }
            }
        }

        return Lookup::Listing { dir: canonical };
    }

    if metadata.is_file() && !request_path.trailing_slash {
        return Lookup::File {
            path: canonical,
            metadata,
        };
    }

    Lookup::NotFound
}

enum Resolved {
    Inside(PathBuf, Metadata),
    Outside,
}

/// Canonicalize `candidate` and fetch its metadata; `None` if it does not exist
async fn resolve_within(root: &Path, candidate: &Path, raw_path: &str) -> Option<Resolved> {
    let canonical = fs::canonicalize(candidate).await.ok()?;
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            raw_path,
            canonical.display()
        ));
        return Some(Resolved::Outside);
    }
    let metadata = fs::metadata(&canonical).await.ok()?;
    Some(Resolved::Inside(canonical, metadata))
}

async fn serve_file(
    ctx: &RequestContext<'_>,
    path: &Path,
    metadata: &Metadata,
) -> Response<Full<Bytes>> {
    let last_modified = metadata.modified().ok();

    if let Some(modified) = last_modified {
        if cache::not_modified_since(ctx.if_modified_since, modified) {
            return http::build_304_response(&cache::format_http_date(modified));
        }
    }

    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {}", path.display(), e));
            return http::build_404_response();
        }
    };

    let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));
    let last_modified = last_modified.map(cache::format_http_date);

    http::build_file_response(
        Bytes::from(content),
        content_type,
        last_modified.as_deref(),
        ctx.is_head,
    )
}

async fn serve_listing(ctx: &RequestContext<'_>, dir: &Path) -> Response<Full<Bytes>> {
    let display_path =
        http::path::percent_decode(ctx.path).unwrap_or_else(|| ctx.path.to_string());
    match listing::render(dir, &display_path).await {
        Ok(html) => http::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to list directory '{}': {}",
                dir.display(),
                e
            ));
            http::build_404_response()
        }
    }
}
