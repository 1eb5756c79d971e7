//! Tests against the checked-in skill tree under `testdata/skills`.
//!
//! The tree holds one clean skill, one with warnings, one with errors, one
//! without a document, and a `_template` directory that is never validated.

use std::path::PathBuf;
use std::process::Command;

use skillgate::batch::run_batch;
use skillgate::config::Config;
use skillgate::gates::{Code, Runner};
use skillgate::report::{self, JsonBatchReport};
use skillgate::score::Grade;
use skillgate::skill::{locate_packages, Package};

fn skills_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("skills")
}

fn runner() -> Runner {
    Runner::new(Config::default()).expect("default config is valid")
}

fn codes(issues: &[skillgate::gates::Issue]) -> Vec<Code> {
    issues.iter().map(|i| i.code).collect()
}

#[test]
fn locator_skips_template_directories() {
    let names: Vec<String> = locate_packages(&skills_root())
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(
        names,
        vec!["bad-skill", "empty-skill", "good-skill", "warn-skill"]
    );
}

#[test]
fn good_skill_is_clean() {
    let report = runner().run(&Package::resolve(&skills_root(), "good-skill"));
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.grade, Grade::A);
    assert!(report.passed.iter().any(|p| p == "Listed in README.md"));
}

#[test]
fn warn_skill_has_only_warnings() {
    let report = runner().run(&Package::resolve(&skills_root(), "warn-skill"));
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(
        codes(&report.warnings),
        vec![
            Code::WorkflowWithoutSteps,
            Code::BrokenLink,
            Code::NotInRegistry
        ]
    );
    assert_eq!(report.grade, Grade::C);
    assert!(report.is_valid());
}

#[test]
fn bad_skill_reports_header_and_sections() {
    let report = runner().run(&Package::resolve(&skills_root(), "bad-skill"));
    assert_eq!(
        codes(&report.errors),
        vec![
            Code::HeaderMissing,
            Code::WhenToUseMissing,
            Code::WorkflowMissing,
            Code::GuidesMissing,
            Code::ChecklistMissing,
            Code::RelatedMissing,
        ]
    );
    assert_eq!(report.grade, Grade::F);
}

#[test]
fn batch_totals_and_order() {
    let batch = run_batch(&skills_root(), &runner(), None).unwrap();

    let names: Vec<&str> = batch.skills.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["bad-skill", "empty-skill", "good-skill", "warn-skill"]
    );
    assert_eq!(batch.total_errors, 7);
    assert_eq!(batch.total_warnings, 3);
    assert!(!batch.is_valid());
}

#[test]
fn batch_json_shape() {
    let batch = run_batch(&skills_root(), &runner(), Some(2)).unwrap();
    let mut out = Vec::new();
    report::write_batch_json(&mut out, &batch).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["valid"], false);
    assert_eq!(value["summary"]["skills"], 4);
    assert_eq!(value["summary"]["errors"], 7);
    assert_eq!(value["summary"]["warnings"], 3);
    assert_eq!(value["skills"]["good-skill"]["score"], "A");
    assert_eq!(value["skills"]["empty-skill"]["errors"][0]["code"], "E002");

    let parsed: JsonBatchReport = serde_json::from_slice(&out).unwrap();
    let summed: usize = parsed.skills.values().map(|s| s.summary.errors).sum();
    assert_eq!(summed, parsed.summary.errors);
}

fn skillgate() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_skillgate"));
    cmd.arg("--root").arg(skills_root()).arg("--no-color");
    cmd
}

#[test]
fn cli_exit_codes() {
    let status = skillgate().arg("good-skill").status().unwrap();
    assert_eq!(status.code(), Some(0));

    let status = skillgate().arg("warn-skill").status().unwrap();
    assert_eq!(status.code(), Some(0));

    let status = skillgate().arg("bad-skill").status().unwrap();
    assert_eq!(status.code(), Some(1));

    let status = skillgate().arg("--all").status().unwrap();
    assert_eq!(status.code(), Some(1));

    let status = skillgate()
        .args(["--config", "does-not-exist.yaml", "good-skill"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_json_output() {
    let output = skillgate()
        .args(["warn-skill", "--json"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["skill"], "warn-skill");
    assert_eq!(value["valid"], true);
    assert_eq!(value["score"], "C");
    assert_eq!(value["summary"]["warnings"], 3);
}

#[test]
fn cli_gate_filter() {
    let output = skillgate()
        .args(["bad-skill", "--json", "--gate", "integration"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["errors"], 0);
}

#[test]
fn cli_list_rules() {
    let output = skillgate().arg("--list-rules").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("E001"));
    assert!(text.contains("W402"));
}
