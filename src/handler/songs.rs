//! Song listing endpoint
//!
//! Each immediate subdirectory of the songs folder is one song; only the
//! directory names are exposed, as a JSON array of strings.

use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::Path;
use tokio::fs;

/// Serve the JSON song listing for `songs_dir`, which must resolve under `root`
pub async fn serve(root: &Path, songs_dir: &Path) -> Response<Full<Bytes>> {
    let names = list_song_dirs(root, songs_dir).await;
    match serde_json::to_string(&names) {
        Ok(json) => http::build_json_response(json),
        Err(e) => {
            logger::log_error(&format!("Failed to encode song listing: {e}"));
            http::build_json_response("[]".to_string())
        }
    }
}

/// Names of the immediate subdirectories of `songs_dir`, sorted by name.
///
/// A missing directory yields an empty list, as does one whose canonical
/// path leaves the canonical `root`. Files and nested grandchildren are
/// never included; symlinks to directories are.
pub async fn list_song_dirs(root: &Path, songs_dir: &Path) -> Vec<String> {
    match read_song_dirs(root, songs_dir).await {
        Ok(mut names) => {
            names.sort();
            names
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            logger::log_warning(&format!(
                "Cannot read songs directory '{}': {}",
                songs_dir.display(),
                e
            ));
            Vec::new()
        }
    }
}

async fn read_song_dirs(root: &Path, songs_dir: &Path) -> io::Result<Vec<String>> {
    let canonical = fs::canonicalize(songs_dir).await?;
    if !canonical.starts_with(root) {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("resolves outside the static root to '{}'", canonical.display()),
        ));
    }

    let mut reader = fs::read_dir(&canonical).await?;
    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        if fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir()) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
