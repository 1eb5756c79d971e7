//! Batch validation of every package under a skills root.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;

use crate::gates::{Runner, SkillReport};
use crate::skill::locate_packages;

/// Reports for every package of a batch run, keyed by package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub skills: BTreeMap<String, SkillReport>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl BatchReport {
    /// Collect reports; totals are the sums over all packages.
    pub fn from_reports(reports: impl IntoIterator<Item = SkillReport>) -> Self {
        let skills: BTreeMap<String, SkillReport> = reports
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        let total_errors = skills.values().map(|r| r.errors.len()).sum();
        let total_warnings = skills.values().map(|r| r.warnings.len()).sum();
        Self {
            skills,
            total_errors,
            total_warnings,
        }
    }

    /// A batch fails when any package has an error.
    pub fn is_valid(&self) -> bool {
        self.total_errors == 0
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Validate every package under `root`.
///
/// Packages are validated in parallel; `jobs` bounds the worker count when
/// given. The report is ordered by package name regardless of scheduling.
pub fn run_batch(root: &Path, runner: &Runner, jobs: Option<usize>) -> anyhow::Result<BatchReport> {
    let packages = locate_packages(root)?;
    tracing::debug!(
        root = %root.display(),
        count = packages.len(),
        "validating packages"
    );

    let validate = || -> Vec<SkillReport> { packages.par_iter().map(|p| runner.run(p)).collect() };

    let reports = match jobs {
        Some(n) if n > 0 => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()?
            .install(validate),
        _ => validate(),
    };

    Ok(BatchReport::from_reports(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn skill(root: &Path, name: &str, text: &str) {
        std::fs::create_dir_all(root.join(name)).unwrap();
        std::fs::write(root.join(name).join("SKILL.md"), text).unwrap();
    }

    #[test]
    fn test_totals_are_sums() {
        let temp = TempDir::new().unwrap();
        skill(temp.path(), "alpha", "# Alpha\n");
        skill(temp.path(), "beta", "---\nname: beta\n---\n# Beta\n");
        std::fs::create_dir(temp.path().join("gamma")).unwrap();
        std::fs::create_dir(temp.path().join("_template")).unwrap();

        let runner = Runner::new(Config::default()).unwrap();
        let batch = run_batch(temp.path(), &runner, None).unwrap();

        let names: Vec<&str> = batch.skills.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        let errors: usize = batch.skills.values().map(|r| r.errors.len()).sum();
        let warnings: usize = batch.skills.values().map(|r| r.warnings.len()).sum();
        assert_eq!(batch.total_errors, errors);
        assert_eq!(batch.total_warnings, warnings);
        assert!(!batch.is_valid());
    }

    #[test]
    fn test_job_count_does_not_change_results() {
        let temp = TempDir::new().unwrap();
        for name in ["one", "two", "three", "four"] {
            skill(temp.path(), name, &format!("---\nname: {}\n---\n# T\n", name));
        }
        let runner = Runner::new(Config::default()).unwrap();
        let serial = run_batch(temp.path(), &runner, Some(1)).unwrap();
        let parallel = run_batch(temp.path(), &runner, Some(4)).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let runner = Runner::new(Config::default()).unwrap();
        assert!(run_batch(&temp.path().join("nope"), &runner, None).is_err());
    }
}
