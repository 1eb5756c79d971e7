//! Integration gate: registry listing and related-skill references.
//!
//! Only warnings are produced here; integration problems never block.

use lazy_static::lazy_static;
use regex::Regex;

use crate::rules::{mask_fenced_code, sections};

use super::{CheckContext, Code, Gate, GateKind, GateResult};

lazy_static! {
    /// A backticked name opening a list item: "- `testing` for coverage".
    static ref LEADING_NAME: Regex =
        Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(?:\*\*)?`([a-z][a-z0-9-]*)`").unwrap();
    /// A backticked name followed by "skill": "see the `docker` skill".
    static ref NAMED_SKILL: Regex = Regex::new(r"`([a-z][a-z0-9-]*)`\s+(?i:skill)\b").unwrap();
    static ref SIBLING_LINK: Regex = Regex::new(r"\]\(\.\./([a-z][a-z0-9-]*)(?:/|\))").unwrap();
}

pub struct IntegrationGate;

impl Gate for IntegrationGate {
    fn kind(&self) -> GateKind {
        GateKind::Integration
    }

    fn check(&self, ctx: &CheckContext<'_>) -> GateResult {
        let mut result = GateResult::new(GateKind::Integration);
        if ctx.document.is_none() {
            return result;
        }

        check_registry(ctx, &mut result);
        check_related(ctx, &mut result);

        result
    }
}

fn check_registry(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let pkg = ctx.package;
    let registry = pkg.skills_root.join(&ctx.config.registry);

    if !registry.is_file() {
        tracing::debug!(path = %registry.display(), "no registry document, skipping check");
        result.pass(format!("Registry check skipped ({} not found)", ctx.config.registry));
        return;
    }

    let text = match std::fs::read_to_string(&registry) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                path = %registry.display(),
                error = %e,
                "unreadable registry document"
            );
            result.pass(format!(
                "Registry check skipped ({} unreadable)",
                ctx.config.registry
            ));
            return;
        }
    };

    if mentions_name(&text, &pkg.name) {
        result.pass(format!("Listed in {}", ctx.config.registry));
    } else {
        result.issue(
            Code::NotInRegistry,
            format!("Skill {:?} is not listed in {}", pkg.name, ctx.config.registry),
            format!("Add a row for `{}` to {}", pkg.name, ctx.config.registry),
        );
    }
}

/// Whether `text` mentions `name` as a whole token (not as part of a
/// longer hyphenated name).
pub fn mentions_name(text: &str, name: &str) -> bool {
    let pattern = format!(
        r"(?m)(?:^|[^A-Za-z0-9_-]){}(?:[^A-Za-z0-9_-]|$)",
        regex::escape(name)
    );
    Regex::new(&pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Package names referenced from the Related section, in order, without
/// duplicates.
pub fn related_names(masked_body: &str) -> Vec<String> {
    let Some(lines) = sections::find_section(masked_body, "Related") else {
        return Vec::new();
    };

    let mut names: Vec<String> = Vec::new();
    for line in lines {
        let found = LEADING_NAME
            .captures_iter(line)
            .chain(NAMED_SKILL.captures_iter(line))
            .chain(SIBLING_LINK.captures_iter(line))
            .map(|c| c[1].to_string());
        for name in found {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn check_related(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let Some(doc) = ctx.document else { return };
    let pkg = ctx.package;
    let masked = mask_fenced_code(&doc.body);
    let mut missing = 0;

    let names = related_names(&masked);
    for name in names.iter().filter(|n| **n != pkg.name) {
        if !pkg.sibling_exists(name) {
            missing += 1;
            result.issue(
                Code::RelatedSkillMissing,
                format!("Related skill {:?} does not exist", name),
                format!(
                    "Create the `{}` skill or remove it from the Related section",
                    name
                ),
            );
        }
    }

    if missing == 0 {
        result.pass(format!("All {} related skills exist", names.len()));
    }
}
