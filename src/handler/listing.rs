//! HTML directory listing for directories without an index file

use crate::http::path::{html_escape, percent_encode_segment};
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use tokio::fs;

struct Entry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

/// Render the listing page for `dir`, titled with the decoded request path
///
/// Entries are sorted case-insensitively. Directories get a trailing `/`
/// and symlinks a trailing `@` in the displayed name.
pub async fn render(dir: &Path, display_path: &str) -> io::Result<String> {
    let mut entries = read_entries(dir).await?;
    entries.sort_by_cached_key(|e| e.name.to_lowercase());

    let title = html_escape(&format!("Directory listing for {display_path}"));
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );

    for entry in &entries {
        let mut href = percent_encode_segment(&entry.name);
        let mut label = entry.name.clone();
        if entry.is_dir {
            href.push('/');
            label.push('/');
        }
        if entry.is_symlink {
            label.push('@');
        }
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            html_escape(&href),
            html_escape(&label)
        );
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

async fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|t| t.is_symlink());
        // Follows symlinks, like the label suffix for linked directories
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir()
                .join(format!("scs_listing_{}_{}", name, std::process::id()));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn test_listing_sorted_and_suffixed() {
        let tmp = TempDir::new("sorted");
        let dir = tmp.0.clone();
        std::fs::write(dir.join("b.txt"), b"").unwrap();
        std::fs::write(dir.join("A.txt"), b"").unwrap();
        std::fs::create_dir(dir.join("c dir")).unwrap();

        let html = render(&dir, "/assets/").await.unwrap();
        assert!(html.contains("<title>Directory listing for /assets/</title>"));

        let a = html.find("A.txt").unwrap();
        let b = html.find("b.txt").unwrap();
        let c = html.find("c dir/").unwrap();
        assert!(a < b && b < c);
        assert!(html.contains("<a href=\"c%20dir/\">c dir/</a>"));
    }

    #[tokio::test]
    async fn test_listing_escapes_names() {
        let tmp = TempDir::new("escape");
        let dir = tmp.0.clone();
        std::fs::write(dir.join("<b>&.txt"), b"").unwrap();

        let html = render(&dir, "/<x>/").await.unwrap();
        assert!(html.contains("Directory listing for /&lt;x&gt;/"));
        assert!(html.contains(">&lt;b&gt;&amp;.txt</a>"));
        assert!(html.contains("href=\"%3Cb%3E%26.txt\""));
        assert!(!html.contains("<b>"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_listing_marks_symlinks() {
        let tmp = TempDir::new("symlink");
        let dir = tmp.0.clone();
        std::fs::write(dir.join("real.txt"), b"").unwrap();
        std::os::unix::fs::symlink(dir.join("real.txt"), dir.join("link.txt")).unwrap();

        let html = render(&dir, "/").await.unwrap();
        assert!(html.contains(">link.txt@</a>"));
        assert!(html.contains(">real.txt</a>"));
    }
}
