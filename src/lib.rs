//! Skillgate - quality gate for skill packages.
//!
//! A skill package is a directory holding one primary document (`SKILL.md`)
//! with a small frontmatter header, plus optional reference examples and
//! validation scripts. Skillgate checks packages against four ordered gates
//! and reports every finding with a stable code, a message and a fix.
//!
//! # Architecture
//!
//! - `skill`: package resolution and discovery under a skills root
//! - `document`: document loading and frontmatter parsing
//! - `rules`: static rule tables (names, sections, boundaries, links)
//! - `gates`: the structure, content, quality and integration gates
//! - `score`: letter grade calculation
//! - `batch`: parallel validation of every package under a root
//! - `report`: output formatting (text, JSON)
//! - `config`: optional YAML configuration

pub mod batch;
pub mod cli;
pub mod config;
pub mod document;
pub mod gates;
pub mod report;
pub mod rules;
pub mod score;
pub mod skill;

pub use batch::{run_batch, BatchReport};
pub use config::Config;
pub use document::Document;
pub use gates::{Code, GateKind, GateResult, Issue, Runner, Severity, SkillReport};
pub use score::Grade;
pub use skill::{locate_packages, Package};
