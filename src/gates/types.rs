//! Core types for gate results.

use serde::{Deserialize, Serialize};

/// Severity levels for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The four ordered gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    Structure,
    Content,
    Quality,
    Integration,
}

impl GateKind {
    pub const ALL: [GateKind; 4] = [
        GateKind::Structure,
        GateKind::Content,
        GateKind::Quality,
        GateKind::Integration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GateKind::Structure => "structure",
            GateKind::Content => "content",
            GateKind::Quality => "quality",
            GateKind::Integration => "integration",
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structure" => Ok(GateKind::Structure),
            "content" => Ok(GateKind::Content),
            "quality" => Ok(GateKind::Quality),
            "integration" => Ok(GateKind::Integration),
            _ => Err(format!(
                "unknown gate: {} (expected structure, content, quality or integration)",
                s
            )),
        }
    }
}

/// Stable issue codes.
///
/// Codes starting with `E` are errors, codes starting with `W` are warnings.
/// The string form of a code never changes between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Code {
    // Structure
    DirectoryNotFound,
    DocumentNotFound,
    DocumentUnreadable,
    InvalidName,
    ReservedName,
    // Content
    HeaderMissing,
    HeaderMalformed,
    NameFieldMissing,
    NameMismatch,
    DescriptionMissing,
    DescriptionTooLong,
    DescriptionFirstPerson,
    ToolsFieldMissing,
    TitleMissing,
    WhenToUseMissing,
    WorkflowMissing,
    GuidesMissing,
    ChecklistMissing,
    RelatedMissing,
    ChecklistTooShort,
    // Quality
    TooLong,
    AboveIdealLength,
    CodeBlockTooLong,
    WorkflowWithoutSteps,
    BoundaryViolation,
    BrokenLink,
    ReferenceHeaderMissing,
    ScriptWithoutHelp,
    ScriptWithoutJson,
    // Integration
    NotInRegistry,
    RelatedSkillMissing,
}

impl Code {
    pub const ALL: [Code; 31] = [
        Code::DirectoryNotFound,
        Code::DocumentNotFound,
        Code::DocumentUnreadable,
        Code::InvalidName,
        Code::ReservedName,
        Code::HeaderMissing,
        Code::HeaderMalformed,
        Code::NameFieldMissing,
        Code::NameMismatch,
        Code::DescriptionMissing,
        Code::DescriptionTooLong,
        Code::DescriptionFirstPerson,
        Code::ToolsFieldMissing,
        Code::TitleMissing,
        Code::WhenToUseMissing,
        Code::WorkflowMissing,
        Code::GuidesMissing,
        Code::ChecklistMissing,
        Code::RelatedMissing,
        Code::ChecklistTooShort,
        Code::TooLong,
        Code::AboveIdealLength,
        Code::CodeBlockTooLong,
        Code::WorkflowWithoutSteps,
        Code::BoundaryViolation,
        Code::BrokenLink,
        Code::ReferenceHeaderMissing,
        Code::ScriptWithoutHelp,
        Code::ScriptWithoutJson,
        Code::NotInRegistry,
        Code::RelatedSkillMissing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Code::DirectoryNotFound => "E001",
            Code::DocumentNotFound => "E002",
            Code::DocumentUnreadable => "E003",
            Code::InvalidName => "E004",
            Code::ReservedName => "E005",
            Code::HeaderMissing => "E101",
            Code::HeaderMalformed => "E102",
            Code::NameFieldMissing => "E103",
            Code::NameMismatch => "E104",
            Code::DescriptionMissing => "E105",
            Code::DescriptionTooLong => "E106",
            Code::DescriptionFirstPerson => "E107",
            Code::ToolsFieldMissing => "E108",
            Code::TitleMissing => "E111",
            Code::WhenToUseMissing => "E112",
            Code::WorkflowMissing => "E113",
            Code::GuidesMissing => "E114",
            Code::ChecklistMissing => "E115",
            Code::RelatedMissing => "E116",
            Code::ChecklistTooShort => "W101",
            Code::TooLong => "W301",
            Code::AboveIdealLength => "W302",
            Code::CodeBlockTooLong => "W303",
            Code::WorkflowWithoutSteps => "W304",
            Code::BoundaryViolation => "W305",
            Code::BrokenLink => "W306",
            Code::ReferenceHeaderMissing => "W307",
            Code::ScriptWithoutHelp => "W308",
            Code::ScriptWithoutJson => "W309",
            Code::NotInRegistry => "W401",
            Code::RelatedSkillMissing => "W402",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Code::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    pub fn severity(&self) -> Severity {
        if self.as_str().starts_with('E') {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    pub fn gate(&self) -> GateKind {
        match &self.as_str()[1..2] {
            "0" => GateKind::Structure,
            "1" => GateKind::Content,
            "3" => GateKind::Quality,
            _ => GateKind::Integration,
        }
    }

    /// One-line description used by `--list-rules`.
    pub fn description(&self) -> &'static str {
        match self {
            Code::DirectoryNotFound => "Package directory does not exist",
            Code::DocumentNotFound => "Package has no primary document",
            Code::DocumentUnreadable => "Primary document could not be read",
            Code::InvalidName => "Package name must be lowercase letters, digits and hyphens",
            Code::ReservedName => "Package name is a reserved word",
            Code::HeaderMissing => "Document has no frontmatter block",
            Code::HeaderMalformed => "Frontmatter block could not be parsed",
            Code::NameFieldMissing => "Frontmatter has no `name` field",
            Code::NameMismatch => "Frontmatter `name` differs from the directory name",
            Code::DescriptionMissing => "Frontmatter has no `description` field",
            Code::DescriptionTooLong => "Description exceeds the maximum length",
            Code::DescriptionFirstPerson => "Description is written in the first person",
            Code::ToolsFieldMissing => "Frontmatter has no `allowed-tools` field",
            Code::TitleMissing => "Document has no top-level title heading",
            Code::WhenToUseMissing => "Document has no `When to Use` section",
            Code::WorkflowMissing => "Document has no `Workflow` section",
            Code::GuidesMissing => "Document has no `Guides` section",
            Code::ChecklistMissing => "Document has no `Checklist` section",
            Code::RelatedMissing => "Document has no `Related` section",
            Code::ChecklistTooShort => "Checklist has too few items",
            Code::TooLong => "Document body exceeds the hard line ceiling",
            Code::AboveIdealLength => "Document body exceeds the ideal line ceiling",
            Code::CodeBlockTooLong => "Fenced code block is too long",
            Code::WorkflowWithoutSteps => "Workflow section has no numbered steps",
            Code::BoundaryViolation => "Content covers a topic owned by another skill",
            Code::BrokenLink => "Relative link does not resolve",
            Code::ReferenceHeaderMissing => "Reference example lacks a Location/Usage header",
            Code::ScriptWithoutHelp => "Validation script does not support --help",
            Code::ScriptWithoutJson => "Validation script does not support --json",
            Code::NotInRegistry => "Package is not listed in the registry document",
            Code::RelatedSkillMissing => "Related section names a package that does not exist",
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Code::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown code: {}", s)))
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub code: Code,
    pub message: String,
    pub fix: String,
    pub severity: Severity,
}

impl Issue {
    pub fn new(code: Code, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fix: fix.into(),
            severity: code.severity(),
        }
    }
}

/// Results contributed by one gate invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub gate: GateKind,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub passed: Vec<String>,
    /// Set when a prerequisite is missing and later gates must not run.
    #[serde(default)]
    pub halt: bool,
}

impl GateResult {
    pub fn new(gate: GateKind) -> Self {
        Self {
            gate,
            errors: Vec::new(),
            warnings: Vec::new(),
            passed: Vec::new(),
            halt: false,
        }
    }

    /// Record an issue in the list matching its severity.
    pub fn add(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn issue(&mut self, code: Code, message: impl Into<String>, fix: impl Into<String>) {
        self.add(Issue::new(code, message, fix));
    }

    pub fn pass(&mut self, label: impl Into<String>) {
        self.passed.push(label.into());
    }
}
