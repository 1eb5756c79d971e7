//! Content gate: frontmatter fields and required sections.

use crate::document::{Header, HeaderError};
use crate::rules::{self, mask_fenced_code, sections, REQUIRED_SECTIONS};

use super::{CheckContext, Code, Gate, GateKind, GateResult};

/// Frontmatter keys accepted as the tool declaration.
const TOOL_KEYS: &[&str] = &["allowed-tools", "tools"];

pub struct ContentGate;

impl Gate for ContentGate {
    fn kind(&self) -> GateKind {
        GateKind::Content
    }

    fn check(&self, ctx: &CheckContext<'_>) -> GateResult {
        let mut result = GateResult::new(GateKind::Content);
        let doc = match ctx.document {
            Some(doc) => doc,
            None => return result,
        };

        match &doc.header {
            Ok(header) => {
                result.pass("Frontmatter parsed");
                check_fields(ctx, header, &mut result);
            }
            Err(HeaderError::Missing) => result.issue(
                Code::HeaderMissing,
                format!("{} has no frontmatter block", ctx.config.document),
                "Start the file with `---`, then `name:`, `description:` and `allowed-tools:` lines, then `---`",
            ),
            Err(e) => result.issue(
                Code::HeaderMalformed,
                format!("Frontmatter could not be parsed: {}", e),
                "Use one `key: value` pair per line between the `---` markers",
            ),
        }

        let masked = mask_fenced_code(&doc.body);
        check_sections(ctx, &masked, &mut result);

        result
    }
}

fn check_fields(ctx: &CheckContext<'_>, header: &Header, result: &mut GateResult) {
    let pkg_name = &ctx.package.name;

    match header.get("name") {
        None => result.issue(
            Code::NameFieldMissing,
            "Frontmatter is missing the `name` field",
            format!("Add `name: {}` to the frontmatter", pkg_name),
        ),
        Some(name) if name != pkg_name => result.issue(
            Code::NameMismatch,
            format!(
                "Frontmatter name {:?} does not match directory name {:?}",
                name, pkg_name
            ),
            format!("Set `name: {}` or rename the directory", pkg_name),
        ),
        Some(_) => result.pass("Frontmatter name matches directory"),
    }

    match header.get("description") {
        None => result.issue(
            Code::DescriptionMissing,
            "Frontmatter is missing the `description` field",
            "Add a third-person `description:` saying what the skill does and when to use it",
        ),
        Some(description) => {
            let max = ctx.config.max_description_length;
            let len = description.chars().count();
            if len > max {
                result.issue(
                    Code::DescriptionTooLong,
                    format!("Description is {} characters (max {})", len, max),
                    format!("Shorten the description to at most {} characters", max),
                );
            } else {
                result.pass(format!("Description length OK ({} chars)", len));
            }

            match rules::first_person_phrase(description) {
                Some(phrase) => result.issue(
                    Code::DescriptionFirstPerson,
                    format!("Description uses first-person phrasing: {:?}", phrase),
                    "Write the description in the third person, e.g. \"Reviews pull requests...\"",
                ),
                None => result.pass("Description is written in the third person"),
            }
        }
    }

    if TOOL_KEYS.iter().any(|k| header.contains_key(k)) {
        result.pass("Tool declaration present");
    } else {
        result.issue(
            Code::ToolsFieldMissing,
            "Frontmatter is missing the `allowed-tools` field",
            "Add `allowed-tools:` listing the tools the skill uses",
        );
    }
}

fn check_sections(ctx: &CheckContext<'_>, masked: &str, result: &mut GateResult) {
    for section in REQUIRED_SECTIONS {
        if section.is_present(masked) {
            result.pass(format!("Section present: {}", section.name));
        } else {
            result.issue(
                section.code,
                format!("Missing required section: {}", section.name),
                format!("Add a `{}` heading", section.suggestion),
            );
        }
    }

    if let Some(lines) = sections::find_section(masked, "Checklist") {
        let items = sections::count_list_items(&lines);
        let min = ctx.config.min_checklist_items;
        if items < min {
            result.issue(
                Code::ChecklistTooShort,
                format!("Checklist has {} item(s), expected at least {}", items, min),
                format!("Add checklist items until there are at least {}", min),
            );
        } else {
            result.pass(format!("Checklist has {} items", items));
        }
    }
}
