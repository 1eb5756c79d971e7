//! Structure gate: directory, document, and name checks.

use crate::document::LoadError;
use crate::rules;

use super::{CheckContext, Code, Gate, GateKind, GateResult};

pub struct StructureGate;

impl Gate for StructureGate {
    fn kind(&self) -> GateKind {
        GateKind::Structure
    }

    fn check(&self, ctx: &CheckContext<'_>) -> GateResult {
        let mut result = GateResult::new(GateKind::Structure);
        let pkg = ctx.package;
        let document = &ctx.config.document;

        if !pkg.root.is_dir() {
            result.issue(
                Code::DirectoryNotFound,
                format!("Skill directory not found: {}", pkg.root.display()),
                format!(
                    "Create the directory {} or check the skill name",
                    pkg.root.display()
                ),
            );
            result.halt = true;
            return result;
        }
        result.pass("Skill directory exists");

        if ctx.document.is_none() {
            match ctx.load_error {
                Some(err) if !matches!(err, LoadError::NotFound(_)) => result.issue(
                    Code::DocumentUnreadable,
                    format!("{} could not be read: {}", document, err),
                    format!("Make {} a readable UTF-8 text file", document),
                ),
                _ => result.issue(
                    Code::DocumentNotFound,
                    format!("{} not found in {}", document, pkg.root.display()),
                    format!(
                        "Create {}/{} with frontmatter and the required sections",
                        pkg.name, document
                    ),
                ),
            }
            result.halt = true;
            return result;
        }
        result.pass(format!("{} exists", document));

        if !rules::is_valid_name(&pkg.name, ctx.config.max_name_length) {
            result.issue(
                Code::InvalidName,
                format!(
                    "Invalid skill name {:?}: use a lowercase letter followed by lowercase \
                     letters, digits or hyphens, at most {} characters",
                    pkg.name, ctx.config.max_name_length
                ),
                "Rename the directory, e.g. `my-skill`",
            );
            return result;
        }
        result.pass("Skill name is valid");

        if ctx.config.is_reserved(&pkg.name) {
            result.issue(
                Code::ReservedName,
                format!("Skill name {:?} is reserved", pkg.name),
                "Choose a more specific name for the skill directory",
            );
            return result;
        }
        result.pass("Skill name is not reserved");

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::document::Document;
    use crate::rules::BoundaryTable;
    use crate::skill::Package;
    use tempfile::TempDir;

    fn check(pkg: &Package) -> GateResult {
        let config = Config::default();
        let boundary = BoundaryTable::builtin();
        let loaded = Document::load(&pkg.document_path(&config.document));
        let (document, load_error) = match &loaded {
            Ok(d) => (Some(d), None),
            Err(e) => (None, Some(e)),
        };
        let ctx = CheckContext {
            package: pkg,
            document,
            load_error,
            config: &config,
            boundary: &boundary,
        };
        StructureGate.check(&ctx)
    }

    #[test]
    fn test_missing_directory_halts() {
        let temp = TempDir::new().unwrap();
        let result = check(&Package::resolve(temp.path(), "ghost"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, Code::DirectoryNotFound);
        assert!(result.halt);
    }

    #[test]
    fn test_missing_document_halts() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("empty")).unwrap();
        let result = check(&Package::resolve(temp.path(), "empty"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, Code::DocumentNotFound);
        assert!(result.halt);
    }

    #[test]
    fn test_invalid_name_does_not_halt() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("Bad_Name")).unwrap();
        std::fs::write(temp.path().join("Bad_Name/SKILL.md"), "# x").unwrap();
        let result = check(&Package::resolve(temp.path(), "Bad_Name"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, Code::InvalidName);
        assert!(!result.halt);
    }

    #[test]
    fn test_reserved_name() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("claude")).unwrap();
        std::fs::write(temp.path().join("claude/SKILL.md"), "# x").unwrap();
        let result = check(&Package::resolve(temp.path(), "claude"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, Code::ReservedName);
    }

    #[test]
    fn test_all_pass() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("good-skill")).unwrap();
        std::fs::write(temp.path().join("good-skill/SKILL.md"), "# x").unwrap();
        let result = check(&Package::resolve(temp.path(), "good-skill"));
        assert!(result.errors.is_empty());
        assert_eq!(result.passed.len(), 4);
    }
}
