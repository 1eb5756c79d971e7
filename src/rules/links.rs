//! Inline hyperlink extraction and resolution.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    /// `[text](target)` or `[text](target "title")`, images included.
    static ref INLINE_LINK: Regex =
        Regex::new(r#"!?\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(?:\s+["'][^"']*["'])?\s*\)"#).unwrap();
    static ref SCHEME: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").unwrap();
}

/// An inline link found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub target: String,
    /// 1-based line, relative to the scanned text.
    pub line: usize,
}

/// Extract every inline link from `text`, in order of appearance.
///
/// Callers should pass fence-masked text so links inside code are ignored.
pub fn extract_links(text: &str) -> Vec<Link> {
    let mut links = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        for caps in INLINE_LINK.captures_iter(line) {
            links.push(Link {
                text: caps[1].to_string(),
                target: caps[2].to_string(),
                line: idx + 1,
            });
        }
    }
    links
}

/// Whether a link target is an absolute URL, protocol-relative URL, or a
/// same-document anchor.
pub fn is_external(target: &str) -> bool {
    target.starts_with('#') || target.starts_with("//") || SCHEME.is_match(target)
}

/// Resolve a relative link target against `base`.
///
/// Returns `None` for targets that are not checked (external links, anchors,
/// empty paths). Fragments and query strings are dropped.
pub fn resolve_link(base: &Path, target: &str) -> Option<PathBuf> {
    if is_external(target) {
        return None;
    }
    let path = target.split(['#', '?']).next().unwrap_or("");
    if path.is_empty() {
        return None;
    }
    let path = path.trim_start_matches('/');
    Some(base.join(percent_decode(path)))
}

/// Decode `%20`-style escapes; malformed escapes are kept verbatim.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links() {
        let text = "See [guide](./guides/setup.md) and [site](https://example.org).\n![img](assets/a.png \"A\")";
        let links = extract_links(text);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].target, "./guides/setup.md");
        assert_eq!(links[0].text, "guide");
        assert_eq!(links[0].line, 1);
        assert_eq!(links[2].target, "assets/a.png");
        assert_eq!(links[2].line, 2);
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://example.org"));
        assert!(is_external("mailto:someone@example.org"));
        assert!(is_external("#workflow"));
        assert!(is_external("//cdn.example.org/x.js"));
        assert!(!is_external("./missing-guide.md"));
        assert!(!is_external("../other/SKILL.md"));
    }

    #[test]
    fn test_resolve_link() {
        let base = Path::new("/skills/foo");
        assert_eq!(
            resolve_link(base, "./guides/a.md#step-2"),
            Some(PathBuf::from("/skills/foo/./guides/a.md"))
        );
        assert_eq!(
            resolve_link(base, "my%20notes.md"),
            Some(PathBuf::from("/skills/foo/my notes.md"))
        );
        assert_eq!(resolve_link(base, "#top"), None);
        assert_eq!(resolve_link(base, "?x=1"), None);
    }

    #[test]
    fn test_percent_decode_keeps_malformed() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("a%zzb"), "a%zzb");
    }
}
