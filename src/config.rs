//! Configuration for skillgate.
//!
//! All thresholds have defaults; a YAML file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::rules::boundary::{BoundaryRuleConfig, BoundaryTable};

/// Config file names searched for in the skills root.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["skillgate.yaml", ".skillgate.yaml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// File name of the primary document inside each package.
    pub document: String,
    pub max_name_length: usize,
    /// Reserved names in addition to the built-in set.
    pub reserved_names: Vec<String>,
    pub max_description_length: usize,
    /// Hard ceiling on body lines.
    pub max_lines: usize,
    /// Ideal ceiling on body lines (milder warning).
    pub ideal_lines: usize,
    pub max_code_block_lines: usize,
    pub min_checklist_items: usize,
    /// Maximum boundary violations reported per owner tag.
    pub boundary_report_cap: usize,
    /// Bytes examined on either side of a boundary match for delegation phrases.
    pub delegation_window: usize,
    /// Package subdirectories holding reference examples.
    pub reference_dirs: Vec<String>,
    /// Registry document, relative to the skills root.
    pub registry: String,
    /// Glob patterns (relative to the package root) skipped by auxiliary scans.
    pub exclude: Vec<String>,
    /// Boundary rules appended to the built-in table.
    pub boundary_rules: Vec<BoundaryRuleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: "SKILL.md".to_string(),
            max_name_length: 64,
            reserved_names: Vec::new(),
            max_description_length: 1024,
            max_lines: 300,
            ideal_lines: 200,
            max_code_block_lines: 10,
            min_checklist_items: 3,
            boundary_report_cap: 3,
            delegation_window: 80,
            reference_dirs: vec!["references".to_string(), "examples".to_string()],
            registry: "README.md".to_string(),
            exclude: Vec::new(),
            boundary_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content)
    }

    /// Look for a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Whether `name` is a reserved package name.
    pub fn is_reserved(&self, name: &str) -> bool {
        crate::rules::RESERVED_NAMES.contains(name) || self.reserved_names.iter().any(|r| r == name)
    }

    /// Whether `rel_path` (relative to the package root) matches an `exclude` glob.
    pub fn is_path_excluded(&self, rel_path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }

        let path_str = rel_path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&path_str))
                .unwrap_or(false)
        })
    }

    /// Whether the first component of `rel_path` is a reference subtree.
    pub fn is_reference_path(&self, rel_path: &Path) -> bool {
        rel_path
            .components()
            .next()
            .map(|c| {
                let first = c.as_os_str().to_string_lossy();
                self.reference_dirs.iter().any(|d| *d == first)
            })
            .unwrap_or(false)
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.document.trim().is_empty() {
        return Err(ConfigError::Invalid("document must not be empty".to_string()));
    }
    if config.ideal_lines > config.max_lines {
        return Err(ConfigError::Invalid(format!(
            "ideal_lines ({}) must not exceed max_lines ({})",
            config.ideal_lines, config.max_lines
        )));
    }
    if config.boundary_report_cap == 0 {
        return Err(ConfigError::Invalid(
            "boundary_report_cap must be at least 1".to_string(),
        ));
    }
    if config.max_name_length == 0 {
        return Err(ConfigError::Invalid(
            "max_name_length must be at least 1".to_string(),
        ));
    }

    for pattern in &config.exclude {
        globset::Glob::new(pattern).map_err(|e| {
            ConfigError::Invalid(format!("invalid exclude pattern {:?}: {}", pattern, e))
        })?;
    }

    BoundaryTable::with_extra(&config.boundary_rules)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

    Ok(())
}
