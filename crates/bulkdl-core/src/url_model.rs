//! Destination filename derivation from URLs.
//!
//! The filename is the last non-empty path segment of the URL (the query
//! string never contributes), or the host when the path has none. The result
//! is sanitized for Linux filesystems.

use url::Url;

use crate::error::{Error, Result};

/// Fallback when neither the path nor the host yields a usable name.
const DEFAULT_FILENAME: &str = "download.bin";

/// Derives the local filename a URL's body should be stored under.
///
/// - `http://x/a/b.jpg` → `b.jpg`
/// - `http://x/a/b.jpg?size=xl` → `b.jpg`
/// - `https://www.example.org/` → `www.example.org`
pub fn derive_dest_filename(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw).map_err(|source| Error::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    let candidate = last_path_segment(&parsed).or_else(|| parsed.host_str().map(str::to_string));

    Ok(candidate
        .map(|c| sanitize_filename(&c))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string()))
}

fn last_path_segment(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Sanitizes a candidate filename for safe use on Linux: path separators,
/// NUL, control characters, and whitespace become `_` (runs collapsed),
/// leading/trailing dots, underscores, and spaces are trimmed, and the result
/// is capped at 255 bytes on a char boundary.
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let mapped = match c {
            '\0' | '/' | '\\' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_' || c == ' ');
    let mut end = trimmed.len().min(NAME_MAX);
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_from_path_basename() {
        assert_eq!(
            derive_dest_filename("http://x/a.jpg").unwrap(),
            "a.jpg"
        );
        assert_eq!(
            derive_dest_filename("https://images.example.com/product/converted/885612.jpg")
                .unwrap(),
            "885612.jpg"
        );
    }

    #[test]
    fn query_string_does_not_leak_into_filename() {
        assert_eq!(
            derive_dest_filename("https://images.example.com/a/b.jpg?size=xl").unwrap(),
            "b.jpg"
        );
    }

    #[test]
    fn host_fallback_when_path_is_empty() {
        assert_eq!(
            derive_dest_filename("https://www.example.org/").unwrap(),
            "www.example.org"
        );
        assert_eq!(
            derive_dest_filename("https://www.example.org").unwrap(),
            "www.example.org"
        );
    }

    #[test]
    fn invalid_url_is_a_construction_error() {
        assert!(matches!(
            derive_dest_filename("not a url"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn sanitize_replaces_separators_and_collapses() {
        assert_eq!(sanitize_filename("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_filename("a  b\tc"), "a_b_c");
        assert_eq!(sanitize_filename("file\x00\x01name"), "file_name");
    }

    #[test]
    fn sanitize_trims_edges() {
        assert_eq!(sanitize_filename(".. file.txt .."), "file.txt");
        assert_eq!(sanitize_filename("___x___"), "x");
    }

    #[test]
    fn sanitize_caps_length_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= 255);
        assert!(out.is_char_boundary(out.len()));
    }
}
