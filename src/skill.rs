//! Skill packages and their discovery under a root directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A named unit under validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Directory base name.
    pub name: String,
    /// The package directory.
    pub root: PathBuf,
    /// Directory holding all packages (parent of `root`).
    pub skills_root: PathBuf,
}

impl Package {
    /// Resolve a package named (or pathed) `arg` under `skills_root`.
    ///
    /// `arg` may be a bare name or a relative path such as `skills/foo`; the
    /// package name is always the final path component.
    pub fn resolve(skills_root: &Path, arg: &str) -> Self {
        let trimmed = arg.trim_end_matches(['/', '\\']);
        let root = skills_root.join(trimmed);
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| trimmed.to_string());
        let parent = root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| skills_root.to_path_buf());
        Self {
            name,
            root,
            skills_root: parent,
        }
    }

    /// Path of the primary document.
    pub fn document_path(&self, document: &str) -> PathBuf {
        self.root.join(document)
    }

    /// Whether a sibling package called `name` exists.
    pub fn sibling_exists(&self, name: &str) -> bool {
        self.skills_root.join(name).is_dir()
    }
}

/// Enumerate candidate packages directly under `root`, sorted by name.
///
/// Hidden directories and directories starting with `_` (templates, scratch
/// space) are not candidates.
pub fn locate_packages(root: &Path) -> anyhow::Result<Vec<Package>> {
    if !root.is_dir() {
        anyhow::bail!("skills root {} is not a directory", root.display());
    }

    let mut packages = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || name.starts_with('_') {
            tracing::debug!(%name, "skipping non-candidate directory");
            continue;
        }
        packages.push(Package {
            name,
            root: entry.path().to_path_buf(),
            skills_root: root.to_path_buf(),
        });
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(root = %root.display(), count = packages.len(), "located packages");
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_packages_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        for dir in ["zeta", "alpha", ".git", "_template", "mid"] {
            std::fs::create_dir(temp.path().join(dir)).unwrap();
        }
        std::fs::write(temp.path().join("README.md"), "# Skills").unwrap();

        let packages = locate_packages(temp.path()).unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert_eq!(packages[0].skills_root, temp.path());
    }

    #[test]
    fn test_locate_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(locate_packages(&temp.path().join("nope")).is_err());
    }

    #[test]
    fn test_resolve_bare_name() {
        let pkg = Package::resolve(Path::new("/repo/skills"), "git-workflow");
        assert_eq!(pkg.name, "git-workflow");
        assert_eq!(pkg.root, PathBuf::from("/repo/skills/git-workflow"));
        assert_eq!(pkg.skills_root, PathBuf::from("/repo/skills"));
    }

    #[test]
    fn test_resolve_nested_path() {
        let pkg = Package::resolve(Path::new("."), "skills/foo/");
        assert_eq!(pkg.name, "foo");
        assert_eq!(pkg.skills_root, PathBuf::from("./skills"));
    }
}
