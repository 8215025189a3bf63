// Application state module
// Immutable state shared by every connection

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::ServerError;

/// Application state
///
/// Built once at startup and shared behind an `Arc`; nothing in here is
/// mutated while serving.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical static root; every served path must stay below it
    pub root: PathBuf,
    /// `<root>/<songs.dir>`, not required to exist; re-resolved per request
    /// and ignored if it leads outside `root`
    pub songs_dir: PathBuf,
}

impl AppState {
    /// Create `AppState` rooted at `config.static_files.root`
    pub fn new(config: &Config) -> Result<Self, ServerError> {
        Self::with_root(config, &config.static_files.root)
    }

    /// Create `AppState` with an explicit root, ignoring `static_files.root`
    pub fn with_root(config: &Config, root: impl AsRef<Path>) -> Result<Self, ServerError> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|source| ServerError::RootMissing {
            path: root.to_path_buf(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(ServerError::RootMissing {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let songs_dir = canonical.join(&config.songs.dir);

        Ok(Self {
            config: config.clone(),
            root: canonical,
            songs_dir,
        })
    }

    /// Whether per-request access lines are written
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Removes the path on drop, file or directory
    struct TempPath(PathBuf);

    impl TempPath {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!("scs_{}_{}", name, std::process::id()));
            let _ = std::fs::remove_dir_all(&path);
            let _ = std::fs::remove_file(&path);
            Self(path)
        }
    }

    impl Drop for TempPath {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn test_missing_root_fails_fast() {
        let cfg = Config::defaults().unwrap();
        let missing = TempPath::new("missing_root");
        let err = AppState::with_root(&cfg, &missing.0).unwrap_err();
        assert!(matches!(err, ServerError::RootMissing { .. }));
    }

    #[test]
    fn test_file_as_root_rejected() {
        let cfg = Config::defaults().unwrap();
        let file = TempPath::new("root_file");
        std::fs::write(&file.0, b"x").unwrap();
        let err = AppState::with_root(&cfg, &file.0).unwrap_err();
        assert!(matches!(err, ServerError::RootMissing { .. }));
    }

    #[test]
    fn test_root_is_canonicalized() {
        let cfg = Config::defaults().unwrap();
        let dir = TempPath::new("root_canon");
        std::fs::create_dir_all(dir.0.join("sub")).unwrap();
        let state = AppState::with_root(&cfg, dir.0.join("sub").join("..")).unwrap();
        assert_eq!(state.root, dir.0.canonicalize().unwrap());
        assert_eq!(state.songs_dir, state.root.join("songs"));
    }
}
