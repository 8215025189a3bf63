//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, the song
//! listing route, static file fallback, then header injection and access
//! logging for whatever response came out.

use crate::config::AppState;
use crate::handler::{songs, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, IF_MODIFIED_SINCE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URI path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    drop(body);

    let mut response = route_request(&parts, &state).await;

    http::apply_server_header(&mut response, &state.config.http.server_name);
    http::apply_standard_headers(&mut response);

    if state.access_log() {
        log_access(&parts, &response, &state, peer_addr, started);
    }

    Ok(response)
}

/// Dispatch on method and path
async fn route_request(req: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    let method = &req.method;
    let uri = &req.uri;

    if *method == Method::OPTIONS {
        return http::build_options_response();
    }

    let song_route = &state.config.songs;
    if *method == Method::GET && song_route.enabled && uri.path() == song_route.route {
        return songs::serve(&state.root, &state.songs_dir).await;
    }

    if *method == Method::GET || *method == Method::HEAD {
        let ctx = RequestContext {
            path: uri.path(),
            query: uri.query(),
            is_head: *method == Method::HEAD,
            if_modified_since: header_str(&req.headers, &IF_MODIFIED_SINCE),
        };
        let files = &state.config.static_files;
        return static_files::serve(
            &ctx,
            &state.root,
            &files.index_files,
            files.directory_listing,
        )
        .await;
    }

    logger::log_warning(&format!("Unsupported method: {method}"));
    http::build_501_response()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    state: &AppState,
    peer_addr: SocketAddr,
    started: Instant,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = match req.version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(&req.headers, &REFERER).map(ToString::to_string);
    entry.user_agent = header_str(&req.headers, &USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::http::STANDARD_HEADERS;
    use http_body_util::BodyExt;
    use std::path::PathBuf;

    struct Fixture {
        dir: PathBuf,
        state: Arc<AppState>,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            Self::with_config(name, |_| {})
        }

        fn with_config(name: &str, edit: impl FnOnce(&mut Config)) -> Self {
            let dir = std::env::temp_dir()
                .join(format!("scs_router_{}_{}", name, std::process::id()));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(dir.join("static/js")).unwrap();
            std::fs::write(dir.join("static/index.html"), b"<h1>game</h1>").unwrap();
            std::fs::write(dir.join("static/js/Arrow.js"), b"class Arrow {}").unwrap();
            std::fs::write(dir.join("secret.txt"), b"top secret").unwrap();

            let mut cfg = Config::defaults().unwrap();
            cfg.logging.access_log = false;
            edit(&mut cfg);
            let state = Arc::new(AppState::with_root(&cfg, dir.join("static")).unwrap());
            Self { dir, state }
        }

        async fn send(&self, method: &str, uri: &str) -> (Response<Full<Bytes>>, Bytes) {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(())
                .unwrap();
            let peer = "127.0.0.1:9".parse().unwrap();
            let resp = handle_request(req, Arc::clone(&self.state), peer)
                .await
                .unwrap();
            let (parts, body) = resp.into_parts();
            let bytes = body.collect().await.unwrap().to_bytes();
            (Response::from_parts(parts, Full::new(bytes.clone())), bytes)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn assert_standard_headers(resp: &Response<Full<Bytes>>) {
        for (name, value) in STANDARD_HEADERS {
            assert!(
                resp.headers().get_all(name).iter().any(|v| v == value),
                "missing {name}: {value} on {}",
                resp.status()
            );
        }
    }

    #[tokio::test]
    async fn test_get_file_returns_exact_bytes() {
        let fx = Fixture::new("file");
        let (resp, body) = fx.send("GET", "/js/Arrow.js").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/javascript");
        assert_eq!(&body[..], b"class Arrow {}");
        assert_standard_headers(&resp);
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let fx = Fixture::new("head");
        let (resp, body) = fx.send("HEAD", "/js/Arrow.js").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "14");
        assert!(body.is_empty());
        assert_standard_headers(&resp);
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let fx = Fixture::new("index");
        let (resp, body) = fx.send("GET", "/").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(&body[..], b"<h1>game</h1>");
    }

    #[tokio::test]
    async fn test_options_any_path_is_empty_200() {
        let fx = Fixture::new("options");
        for uri in ["/", "/songs/", "/does-not-exist.xyz", "/../secret.txt"] {
            let (resp, body) = fx.send("OPTIONS", uri).await;
            assert_eq!(resp.status(), 200, "OPTIONS {uri}");
            assert!(body.is_empty());
            assert_standard_headers(&resp);
        }
    }

    #[tokio::test]
    async fn test_songs_listing() {
        let fx = Fixture::new("songs");
        let songs = fx.state.root.join("songs");
        std::fs::create_dir_all(songs.join("tutorial")).unwrap();
        std::fs::create_dir_all(songs.join("boss/extra")).unwrap();
        std::fs::write(songs.join("notes.txt"), b"").unwrap();

        let (resp, body) = fx.send("GET", "/songs/").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(&body[..], br#"["boss","tutorial"]"#);
        assert_standard_headers(&resp);
    }

    #[tokio::test]
    async fn test_songs_listing_missing_dir() {
        let fx = Fixture::new("songs_missing");
        let (resp, body) = fx.send("GET", "/songs/").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(&body[..], b"[]");
    }

    #[tokio::test]
    async fn test_songs_files_still_served_statically() {
        let fx = Fixture::new("songs_files");
        let song = fx.state.root.join("songs/tutorial");
        std::fs::create_dir_all(&song).unwrap();
        std::fs::write(song.join("tutorial.purin"), b"chart-data").unwrap();

        let (resp, body) = fx.send("GET", "/songs/tutorial/tutorial.purin").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(&body[..], b"chart-data");
    }

    #[tokio::test]
    async fn test_head_songs_falls_back_to_static() {
        let fx = Fixture::new("songs_head");
        std::fs::create_dir_all(fx.state.root.join("songs/a")).unwrap();
        let (resp, body) = fx.send("HEAD", "/songs/").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_songs_endpoint_disabled() {
        let fx = Fixture::with_config("songs_disabled", |cfg| cfg.songs.enabled = false);
        let (resp, _) = fx.send("GET", "/songs/").await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_missing_file_is_404_with_headers() {
        let fx = Fixture::new("missing");
        let (resp, _) = fx.send("GET", "/does-not-exist.xyz").await;
        assert_eq!(resp.status(), 404);
        assert_standard_headers(&resp);
    }

    #[tokio::test]
    async fn test_traversal_never_leaks() {
        let fx = Fixture::new("traversal");
        for uri in ["/../secret.txt", "/js/../../secret.txt", "/%2e%2e/secret.txt"] {
            let (resp, body) = fx.send("GET", uri).await;
            assert!(resp.status().is_client_error(), "GET {uri} -> {}", resp.status());
            assert!(!body.windows(6).any(|w| w == b"secret"));
            assert_standard_headers(&resp);
        }
    }

    #[tokio::test]
    async fn test_directory_redirect() {
        let fx = Fixture::new("redirect");
        let (resp, _) = fx.send("GET", "/js").await;
        assert_eq!(resp.status(), 301);
        assert_eq!(resp.headers()["location"], "/js/");
        assert_standard_headers(&resp);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let fx = Fixture::new("post");
        let (resp, _) = fx.send("POST", "/index.html").await;
        assert_eq!(resp.status(), 501);
        assert_standard_headers(&resp);
    }

    #[tokio::test]
    async fn test_server_header() {
        let fx = Fixture::new("server_header");
        let (resp, _) = fx.send("GET", "/").await;
        assert_eq!(resp.headers()["server"], "StaticCors/1.0");
    }
}
