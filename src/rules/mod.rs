//! Declarative rule tables used by the gates.
//!
//! Everything here is data plus small pure functions over text, so each
//! table can be tested without touching the filesystem.

pub mod boundary;
pub mod code_blocks;
pub mod links;
pub mod sections;

use lazy_static::lazy_static;
use regex::Regex;

pub use boundary::{cap_per_owner, BoundaryFinding, BoundaryRule, BoundaryTable, Scope};
pub use code_blocks::{fenced_blocks, mask_fenced_code, FencedBlock};
pub use links::{extract_links, is_external, resolve_link, Link};
pub use sections::{find_section, RequiredSection, REQUIRED_SECTIONS};

/// Package names that may never be used.
pub static RESERVED_NAMES: phf::Set<&'static str> = phf::phf_set! {
    "anthropic",
    "claude",
    "skill",
    "skills",
    "template",
    "test",
};

lazy_static! {
    /// Valid package names: lowercase letter first, then lowercase letters, digits, hyphens.
    pub static ref NAME_PATTERN: Regex = Regex::new(r"^[a-z][a-z0-9-]*$").unwrap();

    /// First-person phrasing in descriptions.
    pub static ref FIRST_PERSON_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bI\s+(can|will|am|help|do|have|would)\b").unwrap(),
        Regex::new(r"(?i)\bI'(m|ll|ve|d)\b").unwrap(),
        Regex::new(r"(?i)\bwe\s+(can|will|are|help|do|have|would)\b").unwrap(),
        Regex::new(r"(?i)\bwe'(re|ll|ve|d)\b").unwrap(),
        Regex::new(r"(?i)\blet\s+me\b").unwrap(),
        Regex::new(r"(?i)^\s*(my|our)\b").unwrap(),
    ];
}

/// Whether a name is a syntactically valid package name.
pub fn is_valid_name(name: &str, max_len: usize) -> bool {
    !name.is_empty() && name.len() <= max_len && NAME_PATTERN.is_match(name)
}

/// Return the first first-person phrase in `text`, if any.
pub fn first_person_phrase(text: &str) -> Option<&str> {
    FIRST_PERSON_PATTERNS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("git-workflow", 64));
        assert!(is_valid_name("a1", 64));
        assert!(!is_valid_name("Git", 64));
        assert!(!is_valid_name("1git", 64));
        assert!(!is_valid_name("git_workflow", 64));
        assert!(!is_valid_name("", 64));
        assert!(!is_valid_name(&"a".repeat(65), 64));
        assert!(is_valid_name(&"a".repeat(64), 64));
    }

    #[test]
    fn test_reserved_names() {
        assert!(RESERVED_NAMES.contains("claude"));
        assert!(!RESERVED_NAMES.contains("claude-helper"));
    }

    #[test]
    fn test_first_person_detection() {
        assert_eq!(first_person_phrase("I can help you do X"), Some("I can"));
        assert!(first_person_phrase("We will format your code").is_some());
        assert!(first_person_phrase("I'll review the diff").is_some());
        assert!(first_person_phrase("Reviews pull requests. Use when I/O is slow.").is_none());
        assert!(first_person_phrase("Formats code and runs linters").is_none());
    }
}
