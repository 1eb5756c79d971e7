//! Topic ownership rules.
//!
//! Each rule names a topic pattern and the skill that owns the topic. Any
//! other skill that covers the topic in depth is flagged, unless the match
//! sits next to a delegation phrase ("see the `git-workflow` skill").
//!
//! The delegation check looks at a fixed byte window around each match. It
//! is an approximation: a delegation phrase in the neighbouring sentence can
//! suppress a real violation, and a delegation phrased some other way is not
//! recognised.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which files a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The primary document and auxiliary text files.
    #[default]
    Everywhere,
    /// The primary document only.
    DocumentOnly,
}

/// A boundary rule as written in a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundaryRuleConfig {
    pub pattern: String,
    pub owner: String,
    pub description: String,
    #[serde(default)]
    pub scope: Scope,
}

/// A compiled boundary rule.
#[derive(Debug, Clone)]
pub struct BoundaryRule {
    pub regex: Regex,
    pub owner: String,
    pub description: String,
    pub scope: Scope,
}

impl BoundaryRule {
    pub fn new(
        pattern: &str,
        owner: &str,
        description: &str,
        scope: Scope,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            owner: owner.to_string(),
            description: description.to_string(),
            scope,
        })
    }
}

/// Built-in rules: (pattern, owner, description, scope).
static BUILTIN_RULES: &[(&str, &str, &str, Scope)] = &[
    (
        r"\bgit\s+(rebase\s+-i|commit\s+--amend|push\s+--force(-with-lease)?)\b",
        "git-workflow",
        "Git history rewriting",
        Scope::Everywhere,
    ),
    (
        r"(?i)\bconventional\s+commits?\b",
        "git-workflow",
        "Commit message conventions",
        Scope::DocumentOnly,
    ),
    (
        r"(?m)\bdocker\s+(build|run|compose\s+up)\b|^FROM\s+[a-z0-9./-]+(:\S+)?\s*$",
        "docker",
        "Container image build and run commands",
        Scope::Everywhere,
    ),
    (
        r"\bkubectl\s+(apply|rollout|delete|scale)\b",
        "kubernetes",
        "Cluster deployment commands",
        Scope::Everywhere,
    ),
    (
        r"\bpytest\s+[^\n]*--cov\b|\bcoverage\s+(report|html)\b|\bcargo\s+(tarpaulin|llvm-cov)\b",
        "testing",
        "Test coverage measurement",
        Scope::Everywhere,
    ),
    (
        r"(?i)\b(OWASP|SQL\s+injection|cross-site\s+scripting)\b",
        "security-review",
        "Security vulnerability guidance",
        Scope::DocumentOnly,
    ),
    (
        r"\b(ALTER|CREATE|DROP)\s+TABLE\b",
        "database-migrations",
        "Schema migration statements",
        Scope::Everywhere,
    ),
    (
        r"\.github/workflows/|\bruns-on:\s",
        "ci-cd",
        "CI pipeline definitions",
        Scope::Everywhere,
    ),
    (
        r"\b(npm|cargo)\s+publish\b|\btwine\s+upload\b",
        "release",
        "Package publishing",
        Scope::Everywhere,
    ),
    (
        r"(?i)\bsemantic\s+versioning\b|\bsemver\s+bump\b",
        "release",
        "Version numbering policy",
        Scope::DocumentOnly,
    ),
    (
        r"\bterraform\s+(apply|plan|destroy)\b",
        "infrastructure",
        "Infrastructure provisioning commands",
        Scope::Everywhere,
    ),
    (
        r"(?i)\bflame\s*graphs?\b|\bperf\s+record\b",
        "performance",
        "Profiling workflows",
        Scope::Everywhere,
    ),
];

lazy_static! {
    static ref BUILTIN: Vec<BoundaryRule> = BUILTIN_RULES
        .iter()
        .map(|(pattern, owner, description, scope)| {
            BoundaryRule::new(pattern, owner, description, *scope).unwrap()
        })
        .collect();

    /// Phrases that hand a topic off to its owner instead of covering it.
    static ref DELEGATION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(see|use|run|invoke|load|consult|refer\s+to|delegate\s+to|defer\s+to|hand\s+off\s+to)\s+(the\s+)?`?[a-z0-9-]+`?\s+(skill|tool)\b").unwrap(),
        Regex::new(r"(?i)\b(handled|covered|owned)\s+by\s+(the\s+)?`?[a-z0-9-]+`?").unwrap(),
        Regex::new(r"\]\(\.\./[a-z0-9-]+/").unwrap(),
    ];
}

/// One reported violation: a rule owner matched in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryFinding {
    pub file: String,
    pub owner: String,
    pub description: String,
    /// 1-based line of the first undelegated match.
    pub line: usize,
    /// Number of undelegated matches for this owner in this file.
    pub count: usize,
    pub matched: String,
}

/// The full rule table.
#[derive(Debug, Clone)]
pub struct BoundaryTable {
    rules: Vec<BoundaryRule>,
}

impl Default for BoundaryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BoundaryTable {
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN.clone(),
        }
    }

    /// The built-in rules followed by `extra`.
    pub fn with_extra(extra: &[BoundaryRuleConfig]) -> Result<Self, regex::Error> {
        let mut table = Self::builtin();
        for r in extra {
            table
                .rules
                .push(BoundaryRule::new(&r.pattern, &r.owner, &r.description, r.scope)?);
        }
        Ok(table)
    }

    pub fn rules(&self) -> &[BoundaryRule] {
        &self.rules
    }

    /// Scan one file. Returns at most one finding per owner, in rule order.
    ///
    /// Rules owned by `package` are skipped. `DocumentOnly` rules are skipped
    /// unless `is_document` is set.
    pub fn scan(
        &self,
        file: &str,
        text: &str,
        package: &str,
        is_document: bool,
        window: usize,
    ) -> Vec<BoundaryFinding> {
        let mut findings: Vec<BoundaryFinding> = Vec::new();

        for rule in &self.rules {
            if rule.owner == package {
                continue;
            }
            if rule.scope == Scope::DocumentOnly && !is_document {
                continue;
            }

            for m in rule.regex.find_iter(text) {
                if is_delegated(text, m.start(), m.end(), window) {
                    continue;
                }

                match findings.iter_mut().find(|f| f.owner == rule.owner) {
                    Some(existing) => existing.count += 1,
                    None => findings.push(BoundaryFinding {
                        file: file.to_string(),
                        owner: rule.owner.clone(),
                        description: rule.description.clone(),
                        line: line_of(text, m.start()),
                        count: 1,
                        matched: m.as_str().trim().to_string(),
                    }),
                }
            }
        }

        findings
    }
}

/// Keep at most `cap` findings per owner, preserving order.
pub fn cap_per_owner(findings: Vec<BoundaryFinding>, cap: usize) -> Vec<BoundaryFinding> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    findings
        .into_iter()
        .filter(|f| {
            let n = seen.entry(f.owner.clone()).or_insert(0);
            *n += 1;
            *n <= cap
        })
        .collect()
}

/// Whether a delegation phrase appears within `window` bytes of the match.
pub fn is_delegated(text: &str, start: usize, end: usize, window: usize) -> bool {
    let lo = floor_boundary(text, start.saturating_sub(window));
    let hi = ceil_boundary(text, end.saturating_add(window).min(text.len()));
    let context = &text[lo..hi];
    DELEGATION_PATTERNS.iter().any(|re| re.is_match(context))
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
