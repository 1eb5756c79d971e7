//! Quality gate: length, code blocks, workflow shape, topic boundaries,
//! links, reference examples, and validation scripts.
//!
//! Every finding here is a warning.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::rules::{
    cap_per_owner, extract_links, fenced_blocks, mask_fenced_code, resolve_link, sections,
    BoundaryFinding,
};

use super::{CheckContext, Code, Gate, GateKind, GateResult};

/// Text files scanned for boundary violations.
const TEXT_EXTENSIONS: &[&str] = &[
    "md", "txt", "rst", "sh", "bash", "py", "js", "ts", "rb", "yaml", "yml", "toml", "json",
];

/// Code files inside reference subtrees that need a header comment.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "sh", "bash", "js", "jsx", "ts", "tsx", "rb", "go", "rs", "java", "kt", "c", "cpp",
    "h", "hpp", "swift", "sql",
];

/// Extensions that mark a file as a runnable script.
const SCRIPT_EXTENSIONS: &[&str] = &["sh", "bash", "zsh", "py", "js", "mjs", "ts", "rb", "pl"];

/// How many leading lines of a reference example may hold its header.
const REFERENCE_HEADER_LINES: usize = 15;

lazy_static! {
    static ref LOCATION_FIELD: Regex = Regex::new(r"(?i)\blocation\s*:").unwrap();
    static ref USAGE_FIELD: Regex = Regex::new(r"(?i)\busage\s*:").unwrap();
}

pub struct QualityGate;

impl Gate for QualityGate {
    fn kind(&self) -> GateKind {
        GateKind::Quality
    }

    fn check(&self, ctx: &CheckContext<'_>) -> GateResult {
        let mut result = GateResult::new(GateKind::Quality);
        if ctx.document.is_none() {
            return result;
        }

        check_length(ctx, &mut result);
        check_code_blocks(ctx, &mut result);
        check_workflow(ctx, &mut result);
        check_boundaries(ctx, &mut result);
        check_links(ctx, &mut result);
        check_reference_files(ctx, &mut result);
        check_validation_scripts(ctx, &mut result);

        result
    }
}

fn check_length(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let Some(doc) = ctx.document else { return };
    let lines = doc.body_line_count();
    let max = ctx.config.max_lines;
    let ideal = ctx.config.ideal_lines;

    if lines > max {
        result.issue(
            Code::TooLong,
            format!("{} body is {} lines (max {})", ctx.config.document, lines, max),
            "Move detail into guides or reference files and link to them",
        );
    } else if lines > ideal {
        result.issue(
            Code::AboveIdealLength,
            format!(
                "{} body is {} lines (ideal is at most {})",
                ctx.config.document, lines, ideal
            ),
            "Consider moving detail into guides or reference files",
        );
    } else {
        result.pass(format!("Length OK ({} lines)", lines));
    }
}

fn check_code_blocks(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let Some(doc) = ctx.document else { return };
    let max = ctx.config.max_code_block_lines;
    let mut long = 0;

    for block in fenced_blocks(&doc.body) {
        if block.line_count > max {
            long += 1;
            let line = doc.body_start_line + block.start_line - 1;
            let lang = if block.lang.is_empty() {
                String::new()
            } else {
                format!(" ({})", block.lang)
            };
            result.issue(
                Code::CodeBlockTooLong,
                format!(
                    "Code block{} at line {} is {} lines (max {})",
                    lang, line, block.line_count, max
                ),
                "Move the example into a reference file and link to it",
            );
        }
    }

    if long == 0 {
        result.pass("Code blocks are concise");
    }
}

fn check_workflow(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let Some(doc) = ctx.document else { return };
    let masked = mask_fenced_code(&doc.body);
    let Some(lines) = sections::find_section(&masked, "Workflow") else {
        return;
    };

    if sections::has_ordered_steps(&lines) {
        result.pass("Workflow has numbered steps");
    } else {
        result.issue(
            Code::WorkflowWithoutSteps,
            "Workflow section has no numbered steps",
            "Use `### Step 1: ...` sub-headings or a numbered list",
        );
    }
}

fn check_boundaries(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let Some(doc) = ctx.document else { return };
    let pkg = ctx.package;
    let window = ctx.config.delegation_window;

    let mut findings: Vec<BoundaryFinding> = ctx
        .boundary
        .scan(&ctx.config.document, &doc.body, &pkg.name, true, window)
        .into_iter()
        .map(|mut f| {
            f.line += doc.body_start_line - 1;
            f
        })
        .collect();

    for path in auxiliary_files(ctx) {
        let rel = relative(&pkg.root, &path);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                findings.extend(ctx.boundary.scan(&rel, &text, &pkg.name, false, window));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            }
        }
    }

    let findings = cap_per_owner(findings, ctx.config.boundary_report_cap);
    if findings.is_empty() {
        result.pass("No topic boundary violations");
    }

    for f in findings {
        let times = if f.count > 1 {
            format!(" ({} occurrences)", f.count)
        } else {
            String::new()
        };
        result.issue(
            Code::BoundaryViolation,
            format!(
                "{}:{} covers {} ({:?}), owned by the `{}` skill{}",
                f.file, f.line, f.description, f.matched, f.owner, times
            ),
            format!(
                "Replace the detail with a pointer, e.g. \"see the `{}` skill\"",
                f.owner
            ),
        );
    }
}

/// Text files in the package other than the primary document, excluding
/// reference subtrees, hidden paths, and configured exclusions.
fn auxiliary_files(ctx: &CheckContext<'_>) -> Vec<PathBuf> {
    let root = &ctx.package.root;
    let document = ctx.package.document_path(&ctx.config.document);

    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            if name.starts_with('.') {
                return false;
            }
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            !ctx.config.is_reference_path(rel) && !ctx.config.is_path_excluded(rel)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| *p != document && has_extension(p, TEXT_EXTENSIONS))
        .collect()
}

fn check_links(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let Some(doc) = ctx.document else { return };
    let masked = mask_fenced_code(&doc.body);
    let mut checked = 0;
    let mut broken = 0;

    for link in extract_links(&masked) {
        let Some(resolved) = resolve_link(&ctx.package.root, &link.target) else {
            continue;
        };
        checked += 1;
        if !resolved.exists() {
            broken += 1;
            result.issue(
                Code::BrokenLink,
                format!(
                    "Broken link [{}] at line {}: {}",
                    link.text,
                    doc.body_start_line + link.line - 1,
                    link.target
                ),
                format!("Create {} or fix the link target", link.target),
            );
        }
    }

    if broken == 0 {
        result.pass(format!("All {} relative links resolve", checked));
    }
}

fn check_reference_files(ctx: &CheckContext<'_>, result: &mut GateResult) {
    let root = &ctx.package.root;
    let mut checked = 0;
    let mut missing = 0;

    for dir in &ctx.config.reference_dirs {
        let ref_root = root.join(dir);
        if !ref_root.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&ref_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !has_extension(path, CODE_EXTENSIONS) {
                continue;
            }
            checked += 1;

            let head = match read_head(path, REFERENCE_HEADER_LINES) {
                Ok(head) => head,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable reference file"
                    );
                    continue;
                }
            };

            let mut absent = Vec::new();
            if !LOCATION_FIELD.is_match(&head) {
                absent.push("Location");
            }
            if !USAGE_FIELD.is_match(&head) {
                absent.push("Usage");
            }
            if !absent.is_empty() {
                missing += 1;
                let rel = relative(root, path);
                result.issue(
                    Code::ReferenceHeaderMissing,
                    format!("{} header comment is missing: {}", rel, absent.join(", ")),
                    format!(
                        "Start {} with a comment containing `Location:` and `Usage:` lines",
                        rel
                    ),
                );
            }
        }
    }

    if checked > 0 && missing == 0 {
        result.pass(format!("All {} reference examples have headers", checked));
    }
}

fn check_validation_scripts(ctx: &CheckContext<'_>, result: &mut GateResult) {
    for path in validation_scripts(&ctx.package.root) {
        let rel = relative(&ctx.package.root, &path);
        let source = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable script");
                continue;
            }
        };

        if source.contains("--help") {
            result.pass(format!("{} supports --help", rel));
        } else {
            result.issue(
                Code::ScriptWithoutHelp,
                format!("Validation script {} does not handle --help", rel),
                format!("Add a --help flag to {}", rel),
            );
        }

        if source.contains("--json") {
            result.pass(format!("{} supports --json", rel));
        } else {
            result.issue(
                Code::ScriptWithoutJson,
                format!("Validation script {} does not handle --json", rel),
                format!("Add a --json output flag to {}", rel),
            );
        }
    }
}

/// Scripts in the package root or `scripts/` whose stem starts with
/// `validate` or `check`.
fn validation_scripts(root: &Path) -> Vec<PathBuf> {
    let mut scripts = Vec::new();
    for dir in [root.to_path_buf(), root.join("scripts")] {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_stem()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("validate") || n.starts_with("check"))
                    .unwrap_or(false)
            })
            .filter(|p| is_script(p))
            .collect();
        found.sort();
        scripts.extend(found);
    }
    scripts
}

/// A script by extension, or an extensionless file starting with `#!`.
fn is_script(path: &Path) -> bool {
    if has_extension(path, SCRIPT_EXTENSIONS) {
        return true;
    }
    path.extension().is_none()
        && read_head(path, 1)
            .map(|head| head.starts_with("#!"))
            .unwrap_or(false)
}

fn read_head(path: &Path, lines: usize) -> std::io::Result<String> {
    let reader = BufReader::new(File::open(path)?);
    let mut head = String::new();
    for line in reader.lines().take(lines) {
        head.push_str(&line?);
        head.push('\n');
    }
    Ok(head)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::document::Document;
    use crate::rules::BoundaryTable;
    use crate::skill::Package;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        pkg: Package,
    }

    fn fixture(name: &str, body: &str) -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join(name);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(
            root.join("SKILL.md"),
            format!("---\nname: {}\ndescription: d\n---\n{}", name, body),
        )
        .unwrap();
        let pkg = Package::resolve(temp.path(), name);
        Fixture { _temp: temp, pkg }
    }

    fn run(fx: &Fixture) -> GateResult {
        let config = Config::default();
        let boundary = BoundaryTable::builtin();
        let doc = Document::load(&fx.pkg.document_path("SKILL.md")).unwrap();
        let ctx = CheckContext {
            package: &fx.pkg,
            document: Some(&doc),
            load_error: None,
            config: &config,
            boundary: &boundary,
        };
        QualityGate.check(&ctx)
    }

    fn count(result: &GateResult, code: Code) -> usize {
        result.warnings.iter().filter(|w| w.code == code).count()
    }

    #[test]
    fn test_never_produces_errors() {
        let body = format!(
            "{}\n```\n{}```\n[x](./nope.md)\n",
            "line\n".repeat(400),
            "c\n".repeat(30)
        );
        let fx = fixture("foo", &body);
        let result = run(&fx);
        assert!(result.errors.is_empty());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_length_bands() {
        let fx = fixture("foo", &"line\n".repeat(350));
        let result = run(&fx);
        assert_eq!(count(&result, Code::TooLong), 1);
        assert_eq!(count(&result, Code::AboveIdealLength), 0);

        let fx = fixture("foo", &"line\n".repeat(250));
        let result = run(&fx);
        assert_eq!(count(&result, Code::TooLong), 0);
        assert_eq!(count(&result, Code::AboveIdealLength), 1);
    }

    #[test]
    fn test_each_long_code_block_reported() {
        let block = format!("```python\n{}```\n", "x = 1\n".repeat(11));
        let short = "```\nok\n```\n";
        let fx = fixture("foo", &format!("{}{}{}", block, short, block));
        let result = run(&fx);
        assert_eq!(count(&result, Code::CodeBlockTooLong), 2);
        assert!(result.warnings[0].message.contains("(python) at line 5"));
    }

    #[test]
    fn test_workflow_without_steps() {
        let fx = fixture("foo", "## Workflow\n- do things\n- more things\n");
        assert_eq!(count(&run(&fx), Code::WorkflowWithoutSteps), 1);

        let fx = fixture("foo", "## Workflow\n### Step 1: Read\n");
        assert_eq!(count(&run(&fx), Code::WorkflowWithoutSteps), 0);
    }

    #[test]
    fn test_broken_link_per_occurrence() {
        let fx = fixture(
            "foo",
            "See [guide](./missing-guide.md) and [again](./missing-guide.md).\n[ok](./SKILL.md) [web](https://example.org) [top](#top)\n",
        );
        let result = run(&fx);
        assert_eq!(count(&result, Code::BrokenLink), 2);
        assert!(result.warnings[0].message.contains("./missing-guide.md"));
        assert!(result.warnings[0].message.contains("[guide]"));
        assert!(result.warnings[1].message.contains("[again]"));
    }

    #[test]
    fn test_existing_link_is_fine() {
        let fx = fixture("foo", "[guide](guides/setup.md#intro)\n");
        std::fs::create_dir_all(fx.pkg.root.join("guides")).unwrap();
        std::fs::write(fx.pkg.root.join("guides/setup.md"), "# Setup").unwrap();
        assert_eq!(count(&run(&fx), Code::BrokenLink), 0);
    }

    #[test]
    fn test_link_in_code_block_ignored() {
        let fx = fixture("foo", "```md\n[x](./nope.md)\n```\n");
        assert_eq!(count(&run(&fx), Code::BrokenLink), 0);
    }

    #[test]
    fn test_boundary_violation_capped() {
        let fx = fixture("foo", &"Run kubectl apply -f deploy.yaml now.\n".repeat(5));
        for i in 0..4 {
            std::fs::write(
                fx.pkg.root.join(format!("notes{}.md", i)),
                "kubectl apply -f x.yaml\n",
            )
            .unwrap();
        }
        let result = run(&fx);
        assert_eq!(count(&result, Code::BoundaryViolation), 3);
        assert!(result.warnings[0].message.contains("SKILL.md"));
        assert!(result.warnings[0].message.contains("5 occurrences"));
    }

    #[test]
    fn test_reference_subtree_not_scanned_for_boundaries() {
        let fx = fixture("foo", "Nothing here.\n");
        std::fs::create_dir_all(fx.pkg.root.join("references")).unwrap();
        std::fs::write(
            fx.pkg.root.join("references/deploy.md"),
            "kubectl apply -f x.yaml\n",
        )
        .unwrap();
        assert_eq!(count(&run(&fx), Code::BoundaryViolation), 0);
    }

    #[test]
    fn test_reference_header_fields() {
        let fx = fixture("foo", "Nothing here.\n");
        let refs = fx.pkg.root.join("references");
        std::fs::create_dir_all(&refs).unwrap();
        std::fs::write(
            refs.join("good.py"),
            "# Location: src/app.py\n# Usage: python good.py\n",
        )
        .unwrap();
        std::fs::write(refs.join("half.sh"), "#!/bin/sh\n# Location: bin/run\necho hi\n")
            .unwrap();
        std::fs::write(refs.join("notes.md"), "no header needed").unwrap();
        let result = run(&fx);
        assert_eq!(count(&result, Code::ReferenceHeaderMissing), 1);
        let w = result
            .warnings
            .iter()
            .find(|w| w.code == Code::ReferenceHeaderMissing)
            .unwrap();
        assert!(w.message.contains("references/half.sh"));
        assert!(w.message.contains("Usage"));
        assert!(!w.message.contains("Location,"));
    }

    #[test]
    fn test_validation_script_flags() {
        let fx = fixture("foo", "Nothing here.\n");
        std::fs::create_dir_all(fx.pkg.root.join("scripts")).unwrap();
        std::fs::write(
            fx.pkg.root.join("scripts/validate.sh"),
            "case $1 in --help) usage;; esac\n",
        )
        .unwrap();
        let result = run(&fx);
        assert_eq!(count(&result, Code::ScriptWithoutHelp), 0);
        assert_eq!(count(&result, Code::ScriptWithoutJson), 1);
    }

    #[test]
    fn test_notes_named_like_scripts_are_not_scripts() {
        let fx = fixture("foo", "Nothing here.\n");
        std::fs::write(fx.pkg.root.join("checklist.md"), "# Review checklist\n- item\n").unwrap();
        std::fs::write(fx.pkg.root.join("check-notes.txt"), "plain notes\n").unwrap();
        let result = run(&fx);
        assert_eq!(count(&result, Code::ScriptWithoutHelp), 0);
        assert_eq!(count(&result, Code::ScriptWithoutJson), 0);
    }

    #[test]
    fn test_extensionless_script_with_shebang() {
        let fx = fixture("foo", "Nothing here.\n");
        std::fs::write(fx.pkg.root.join("check"), "#!/bin/sh\necho ok\n").unwrap();
        let result = run(&fx);
        assert_eq!(count(&result, Code::ScriptWithoutHelp), 1);
        assert_eq!(count(&result, Code::ScriptWithoutJson), 1);
    }
}
