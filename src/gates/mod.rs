//! The four validation gates.
//!
//! Every gate has the same shape: it reads a [`CheckContext`] and returns its
//! own [`GateResult`]. Gates never fail; every problem they find becomes an
//! [`Issue`]. The [`Runner`] decides which gates run and merges the results.

mod content;
mod integration;
mod quality;
mod runner;
mod structure;
mod types;

pub use content::ContentGate;
pub use integration::IntegrationGate;
pub use quality::QualityGate;
pub use runner::{Runner, SkillReport};
pub use structure::StructureGate;
pub use types::{Code, GateKind, GateResult, Issue, Severity};

use crate::config::Config;
use crate::document::{Document, LoadError};
use crate::rules::BoundaryTable;
use crate::skill::Package;

/// Everything a gate may look at for one package.
pub struct CheckContext<'a> {
    pub package: &'a Package,
    /// The loaded document, when loading succeeded.
    pub document: Option<&'a Document>,
    /// Why loading failed, when it did.
    pub load_error: Option<&'a LoadError>,
    pub config: &'a Config,
    pub boundary: &'a BoundaryTable,
}

/// A group of checks.
pub trait Gate: Send + Sync {
    fn kind(&self) -> GateKind;

    fn check(&self, ctx: &CheckContext<'_>) -> GateResult;
}

/// The gate implementing `kind`.
pub fn gate_for(kind: GateKind) -> &'static dyn Gate {
    match kind {
        GateKind::Structure => &StructureGate,
        GateKind::Content => &ContentGate,
        GateKind::Quality => &QualityGate,
        GateKind::Integration => &IntegrationGate,
    }
}
