//! Loading and frontmatter parsing of a package's primary document.
//!
//! The frontmatter block is delimited by `---` lines at the very top of the
//! file and holds simple `key: value` lines. Indented lines continue the
//! previous value (folded with a single space), which covers the `>` and `|`
//! block styles used for long descriptions.

use std::path::{Path, PathBuf};
use thiserror::Error;

const HEADER_MARKER: &str = "---";

/// Why a document could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("{} is a directory, not a file", .0.display())]
    IsDirectory(PathBuf),
    #[error("{} is not valid UTF-8", .0.display())]
    InvalidUtf8(PathBuf),
    #[error("reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why the frontmatter block could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("document does not start with a `---` frontmatter block")]
    Missing,
    #[error("frontmatter block is never closed with `---`")]
    Unterminated,
    #[error("frontmatter line {line} is not a `key: value` pair: {text:?}")]
    Malformed { line: usize, text: String },
}

/// Ordered frontmatter fields.
///
/// Keys keep the position of their first occurrence; a repeated key silently
/// replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<(String, String)>,
}

impl Header {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, key: String, value: String) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    fn append_continuation(&mut self, text: &str) -> bool {
        match self.fields.last_mut() {
            Some((_, value)) => {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(text);
                true
            }
            None => false,
        }
    }
}

/// The loaded content of a package's primary document.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub raw: String,
    pub header: Result<Header, HeaderError>,
    /// Text after the frontmatter block (the whole document when it has none).
    pub body: String,
    /// Line number (1-based) in `raw` of the first body line.
    pub body_start_line: usize,
}

impl Document {
    /// Load and parse the document at `path`.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path.to_path_buf()))
            }
            Err(e) => {
                if path.is_dir() {
                    return Err(LoadError::IsDirectory(path.to_path_buf()));
                }
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let raw =
            String::from_utf8(bytes).map_err(|_| LoadError::InvalidUtf8(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), bytes = raw.len(), "loaded document");
        Ok(Self::from_text(path, raw))
    }

    /// Build a document from text already in memory.
    pub fn from_text(path: &Path, raw: String) -> Self {
        let (header, body, body_start_line) = match split_header(&raw) {
            Ok((header, body_start)) => {
                let body = raw.lines().skip(body_start).collect::<Vec<_>>().join("\n");
                (Ok(header), body, body_start + 1)
            }
            Err(HeaderError::Missing) => (Err(HeaderError::Missing), raw.clone(), 1),
            Err(HeaderError::Unterminated) => {
                // No closing marker: everything after the opening one is body.
                let body = raw.lines().skip(1).collect::<Vec<_>>().join("\n");
                (Err(HeaderError::Unterminated), body, 2)
            }
            Err(e) => {
                // Unparsable frontmatter: keep everything after the closing
                // marker (if any) as the body so section checks still run.
                let (body, start) = match closing_marker_index(&raw) {
                    Some(idx) => (
                        raw.lines().skip(idx + 1).collect::<Vec<_>>().join("\n"),
                        idx + 2,
                    ),
                    None => (raw.lines().skip(1).collect::<Vec<_>>().join("\n"), 2),
                };
                (Err(e), body, start)
            }
        };

        Self {
            path: path.to_path_buf(),
            raw,
            header,
            body,
            body_start_line,
        }
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref().ok()
    }

    /// Number of lines in the body.
    pub fn body_line_count(&self) -> usize {
        self.body.lines().count()
    }
}

fn closing_marker_index(raw: &str) -> Option<usize> {
    let mut lines = raw.lines();
    if lines.next().map(str::trim_end) != Some(HEADER_MARKER) {
        return None;
    }
    lines
        .position(|l| l.trim_end() == HEADER_MARKER)
        .map(|p| p + 1)
}

/// Parse the frontmatter block, returning the header and the index of the
/// first body line.
pub fn split_header(raw: &str) -> Result<(Header, usize), HeaderError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let lines: Vec<&str> = raw.lines().collect();

    if lines.first().map(|l| l.trim_end()) != Some(HEADER_MARKER) {
        return Err(HeaderError::Missing);
    }

    let close = lines
        .iter()
        .skip(1)
        .position(|l| l.trim_end() == HEADER_MARKER)
        .map(|p| p + 1)
        .ok_or(HeaderError::Unterminated)?;

    let header = parse_fields(&lines[1..close], 2)?;
    Ok((header, close + 1))
}

/// Parse `key: value` lines. `first_line` is the 1-based line number of
/// `lines[0]` in the original document.
pub fn parse_fields(lines: &[&str], first_line: usize) -> Result<Header, HeaderError> {
    let mut header = Header::default();

    for (offset, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') || trimmed.starts_with("- ") {
            if header.append_continuation(trimmed) {
                continue;
            }
        }

        let malformed = || HeaderError::Malformed {
            line: first_line + offset,
            text: trimmed.to_string(),
        };

        let (key, value) = trimmed.split_once(':').ok_or_else(malformed)?;
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(malformed());
        }

        header.insert(key.to_string(), clean_value(value));
    }

    Ok(header)
}

fn clean_value(value: &str) -> String {
    let value = value.trim();
    if value == ">" || value == "|" || value == ">-" || value == "|-" {
        return String::new();
    }
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}
