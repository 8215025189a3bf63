//! Request path decoding and normalization
//!
//! Turns the raw URI path into a list of safe segments relative to the
//! static root. Anything that would climb above the root is rejected here,
//! before the filesystem is touched.

/// Why a request path could not be mapped onto the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// Bad percent escape, invalid UTF-8, NUL or backslash
    Malformed,
    /// A `..` segment climbed above the root
    Traversal,
}

/// Normalized request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Decoded segments; never empty strings, `.` or `..`
    pub segments: Vec<String>,
    /// Whether the raw path ended in `/`
    pub trailing_slash: bool,
}

impl RequestPath {
    /// Decode and normalize a URI path (query already stripped)
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let decoded = percent_decode(raw).ok_or(PathError::Malformed)?;
        if decoded.contains('\0') {
            return Err(PathError::Malformed);
        }

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathError::Traversal);
                    }
                }
                s if s.contains('\\') => return Err(PathError::Malformed),
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self {
            segments,
            trailing_slash: decoded.ends_with('/'),
        })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Absolute, re-encoded path of this location as a directory.
    ///
    /// Always starts with exactly one `/`, so it can never be read as a
    /// scheme-relative URL.
    pub fn directory_href(&self) -> String {
        let mut href = String::from("/");
        for segment in &self.segments {
            href.push_str(&percent_encode_segment(segment));
            href.push('/');
        }
        href
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `%XX` escapes; `None` on a truncated escape or non-UTF-8 result
pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Percent-encode a single path segment for use in an href
pub fn percent_encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for &b in segment.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(b));
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Escape text for inclusion in HTML element content or attributes
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let p = RequestPath::parse("/js/Config.js").unwrap();
        assert_eq!(p.segments, vec!["js", "Config.js"]);
        assert!(!p.trailing_slash);
    }

    #[test]
    fn test_parse_root_and_trailing_slash() {
        let p = RequestPath::parse("/").unwrap();
        assert!(p.is_root());
        assert!(p.trailing_slash);

        let p = RequestPath::parse("/songs/").unwrap();
        assert_eq!(p.segments, vec!["songs"]);
        assert!(p.trailing_slash);
    }

    #[test]
    fn test_parse_collapses_dot_segments() {
        let p = RequestPath::parse("/a/./b//../c").unwrap();
        assert_eq!(p.segments, vec!["a", "c"]);
    }

    #[test]
    fn test_directory_href_single_leading_slash() {
        let p = RequestPath::parse("//evil.example").unwrap();
        assert_eq!(p.directory_href(), "/evil.example/");
        let p = RequestPath::parse("/a%2Fb/c d").unwrap();
        assert_eq!(p.directory_href(), "/a/b/c%20d/");
        assert_eq!(RequestPath::parse("/").unwrap().directory_href(), "/");
    }

    #[test]
    fn test_parse_rejects_traversal() {
        assert_eq!(RequestPath::parse("/../secret.txt"), Err(PathError::Traversal));
        assert_eq!(RequestPath::parse("/a/../../etc/passwd"), Err(PathError::Traversal));
        assert_eq!(RequestPath::parse("/%2e%2e/secret.txt"), Err(PathError::Traversal));
        assert_eq!(RequestPath::parse("/..%2fsecret.txt"), Err(PathError::Traversal));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(RequestPath::parse("/bad%zz"), Err(PathError::Malformed));
        assert_eq!(RequestPath::parse("/trunc%4"), Err(PathError::Malformed));
        assert_eq!(RequestPath::parse("/nul%00byte"), Err(PathError::Malformed));
        assert_eq!(RequestPath::parse("/%ff%fe"), Err(PathError::Malformed));
        assert_eq!(RequestPath::parse("/..%5csecret"), Err(PathError::Malformed));
    }

    #[test]
    fn test_percent_decode_utf8() {
        assert_eq!(percent_decode("/My%20Song").as_deref(), Some("/My Song"));
        assert_eq!(percent_decode("%E6%AD%8C").as_deref(), Some("歌"));
    }

    #[test]
    fn test_percent_encode_segment() {
        assert_eq!(percent_encode_segment("My Song"), "My%20Song");
        assert_eq!(percent_encode_segment("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(percent_encode_segment("歌"), "%E6%AD%8C");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;"
        );
    }
}
