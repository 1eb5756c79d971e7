//! Required section headings.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::gates::Code;

/// A heading that every primary document must contain.
pub struct RequiredSection {
    /// Display name used in messages.
    pub name: &'static str,
    /// Heading pattern, matched per line against fence-masked text.
    pub pattern: &'static str,
    /// Code reported when the heading is missing.
    pub code: Code,
    /// Suggested heading to add.
    pub suggestion: &'static str,
}

/// The six required headings, in document order.
pub static REQUIRED_SECTIONS: &[RequiredSection] = &[
    RequiredSection {
        name: "Title",
        pattern: r"^#\s+\S",
        code: Code::TitleMissing,
        suggestion: "# <Skill Title>",
    },
    RequiredSection {
        name: "When to Use",
        pattern: r"(?i)^##\s+when\s+to\s+use\b",
        code: Code::WhenToUseMissing,
        suggestion: "## When to Use",
    },
    RequiredSection {
        name: "Workflow",
        pattern: r"(?i)^##\s+(core\s+)?workflow\b",
        code: Code::WorkflowMissing,
        suggestion: "## Workflow",
    },
    RequiredSection {
        name: "Guides",
        pattern: r"(?i)^##\s+(reference\s+)?guides\b",
        code: Code::GuidesMissing,
        suggestion: "## Guides",
    },
    RequiredSection {
        name: "Checklist",
        pattern: r"(?i)^##\s+(quality\s+)?checklist\b",
        code: Code::ChecklistMissing,
        suggestion: "## Checklist",
    },
    RequiredSection {
        name: "Related",
        pattern: r"(?i)^##\s+related(\s+skills)?\b",
        code: Code::RelatedMissing,
        suggestion: "## Related Skills",
    },
];

lazy_static! {
    static ref COMPILED: HashMap<&'static str, Regex> = REQUIRED_SECTIONS
        .iter()
        .map(|s| (s.name, Regex::new(s.pattern).unwrap()))
        .collect();
    static ref ANY_HEADING: Regex = Regex::new(r"^(#{1,6})\s+\S").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+\S").unwrap();
    static ref NUMBERED_ITEM: Regex = Regex::new(r"^\s*\d+[.)]\s+\S").unwrap();
    static ref STEP_HEADING: Regex =
        Regex::new(r"(?i)^###\s+(step\s+\d+|\d+[.):]|phase\s+\d+)").unwrap();
}

impl RequiredSection {
    fn regex(&self) -> &'static Regex {
        &COMPILED[self.name]
    }

    /// Whether `masked` (fence-masked body text) contains this heading.
    pub fn is_present(&self, masked: &str) -> bool {
        let re = self.regex();
        masked.lines().any(|l| re.is_match(l))
    }
}

/// Find the section by name and return its content lines (excluding the
/// heading), up to the next heading of the same or higher level.
pub fn find_section<'a>(masked: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let section = REQUIRED_SECTIONS.iter().find(|s| s.name == name)?;
    let re = section.regex();
    let lines: Vec<&str> = masked.lines().collect();
    let start = lines.iter().position(|l| re.is_match(l))?;
    let level = ANY_HEADING
        .captures(lines[start])
        .map(|c| c[1].len())
        .unwrap_or(2);

    let content = lines[start + 1..]
        .iter()
        .take_while(|l| {
            ANY_HEADING
                .captures(l)
                .map(|c| c[1].len() > level)
                .unwrap_or(true)
        })
        .copied()
        .collect();
    Some(content)
}

/// Count itemized entries (bullets, numbered items, task boxes).
pub fn count_list_items(lines: &[&str]) -> usize {
    lines.iter().filter(|l| LIST_ITEM.is_match(l)).count()
}

/// Whether the lines contain ordinal step sub-headings or a numbered list.
pub fn has_ordered_steps(lines: &[&str]) -> bool {
    lines
        .iter()
        .any(|l| STEP_HEADING.is_match(l) || NUMBERED_ITEM.is_match(l))
}
