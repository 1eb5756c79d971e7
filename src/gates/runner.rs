//! Gate runner that validates one package end to end.

use serde::Serialize;

use crate::config::Config;
use crate::document::Document;
use crate::rules::BoundaryTable;
use crate::score::{self, Grade};
use crate::skill::Package;

use super::{gate_for, CheckContext, GateKind, GateResult, Issue};

/// Merged outcome of every gate that ran for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillReport {
    pub name: String,
    pub grade: Grade,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub passed: Vec<String>,
}

impl SkillReport {
    /// Merge gate results in the order given.
    pub fn from_results(name: impl Into<String>, results: Vec<GateResult>) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut passed = Vec::new();
        for result in results {
            errors.extend(result.errors);
            warnings.extend(result.warnings);
            passed.extend(result.passed);
        }
        let grade = score::calculate(errors.len(), warnings.len());
        Self {
            name: name.into(),
            grade,
            errors,
            warnings,
            passed,
        }
    }

    /// A package is valid when it has no errors. Warnings never invalidate.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the gates against packages with one shared configuration.
pub struct Runner {
    config: Config,
    boundary: BoundaryTable,
    only: Option<GateKind>,
}

impl Runner {
    /// Create a runner, compiling any extra boundary rules from `config`.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let boundary = BoundaryTable::with_extra(&config.boundary_rules)?;
        Ok(Self {
            config,
            boundary,
            only: None,
        })
    }

    /// Restrict reporting to one gate. Structure prerequisites are still
    /// checked so a missing package or document is always reported.
    pub fn only(mut self, gate: Option<GateKind>) -> Self {
        self.only = gate;
        self
    }

    /// Validate one package.
    pub fn run(&self, package: &Package) -> SkillReport {
        let loaded = if package.root.is_dir() {
            Some(Document::load(&package.document_path(&self.config.document)))
        } else {
            None
        };
        let (document, load_error) = match &loaded {
            Some(Ok(doc)) => (Some(doc), None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        };

        let ctx = CheckContext {
            package,
            document,
            load_error,
            config: &self.config,
            boundary: &self.boundary,
        };

        let structure = gate_for(GateKind::Structure).check(&ctx);
        if structure.halt {
            tracing::debug!(skill = %package.name, "structure prerequisites failed, halting");
            return SkillReport::from_results(&package.name, vec![structure]);
        }

        let mut results = Vec::with_capacity(GateKind::ALL.len());
        match self.only {
            Some(GateKind::Structure) | None => results.push(structure),
            Some(_) => {}
        }
        for kind in GateKind::ALL.into_iter().skip(1) {
            if self.only.map_or(true, |only| only == kind) {
                tracing::debug!(skill = %package.name, gate = %kind, "running gate");
                results.push(gate_for(kind).check(&ctx));
            }
        }

        SkillReport::from_results(&package.name, results)
    }
}
