//! Output formatting for validation results.
//!
//! Supports two output formats:
//! - Text: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use std::collections::BTreeMap;
use std::io::Write;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::batch::BatchReport;
use crate::gates::{Code, GateKind, Issue, Severity, SkillReport};
use crate::score::Grade;

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report for one package. Every key is always present.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub skill: String,
    pub score: String,
    pub valid: bool,
    pub summary: JsonSummary,
    pub passed: Vec<String>,
    pub warnings: Vec<JsonIssue>,
    pub errors: Vec<JsonIssue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonIssue {
    pub code: String,
    pub message: String,
    pub fix: String,
}

/// JSON report for a batch run.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonBatchReport {
    pub valid: bool,
    pub skills: BTreeMap<String, JsonReport>,
    pub summary: JsonBatchSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonBatchSummary {
    pub skills: usize,
    pub errors: usize,
    pub warnings: usize,
}

fn issue_to_json(issue: &Issue) -> JsonIssue {
    JsonIssue {
        code: issue.code.as_str().to_string(),
        message: issue.message.clone(),
        fix: issue.fix.clone(),
    }
}

impl From<&SkillReport> for JsonReport {
    fn from(report: &SkillReport) -> Self {
        JsonReport {
            skill: report.name.clone(),
            score: report.grade.to_string(),
            valid: report.is_valid(),
            summary: JsonSummary {
                passed: report.passed.len(),
                warnings: report.warnings.len(),
                errors: report.errors.len(),
            },
            passed: report.passed.clone(),
            warnings: report.warnings.iter().map(issue_to_json).collect(),
            errors: report.errors.iter().map(issue_to_json).collect(),
        }
    }
}

impl From<&BatchReport> for JsonBatchReport {
    fn from(batch: &BatchReport) -> Self {
        JsonBatchReport {
            valid: batch.is_valid(),
            skills: batch
                .skills
                .iter()
                .map(|(name, report)| (name.clone(), JsonReport::from(report)))
                .collect(),
            summary: JsonBatchSummary {
                skills: batch.len(),
                errors: batch.total_errors,
                warnings: batch.total_warnings,
            },
        }
    }
}

/// Write one package report as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, report: &SkillReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::from(report))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Write a batch report as pretty-printed JSON.
pub fn write_batch_json<W: Write>(out: &mut W, batch: &BatchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&JsonBatchReport::from(batch))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

// =============================================================================
// Text Format
// =============================================================================

/// Write one package report as text. Passed checks are listed only when
/// `verbose` is set.
pub fn write_text<W: Write>(out: &mut W, report: &SkillReport, verbose: bool) -> anyhow::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        "skillgate".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Skill: ".dimmed(), report.name.bold())?;
    writeln!(out)?;

    if verbose && !report.passed.is_empty() {
        writeln!(out, "  {} ({}):", "Passed".green().bold(), report.passed.len())?;
        for label in &report.passed {
            writeln!(out, "    {} {}", "✓".green(), label)?;
        }
        writeln!(out)?;
    }

    if !report.warnings.is_empty() {
        writeln!(out, "  {} ({}):", "Warnings".yellow().bold(), report.warnings.len())?;
        writeln!(out)?;
        write_issues(out, &report.warnings)?;
    }

    if !report.errors.is_empty() {
        writeln!(out, "  {} ({}):", "Errors".red().bold(), report.errors.len())?;
        writeln!(out)?;
        write_issues(out, &report.errors)?;
    }

    if report.errors.is_empty() && report.warnings.is_empty() {
        writeln!(out, "  {}", "✓ All checks passed".green())?;
        writeln!(out)?;
    }

    write_summary_line(
        out,
        report.passed.len(),
        report.warnings.len(),
        report.errors.len(),
        report.grade,
    )?;
    writeln!(out)?;
    Ok(())
}

fn write_issues<W: Write>(out: &mut W, issues: &[Issue]) -> anyhow::Result<()> {
    for issue in issues {
        let tag = format!("[{}]", issue.code);
        let tag = match issue.code.severity() {
            Severity::Error => tag.red(),
            Severity::Warning => tag.yellow(),
        };
        writeln!(out, "    {} {}", tag, issue.message)?;
        writeln!(out, "           {} {}", "fix:".dimmed(), issue.fix)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_summary_line<W: Write>(
    out: &mut W,
    passed: usize,
    warnings: usize,
    errors: usize,
    grade: Grade,
) -> anyhow::Result<()> {
    let status = if errors == 0 {
        "✓ PASS".green()
    } else {
        "✗ FAIL".red()
    };
    writeln!(
        out,
        "  {}  {} passed, {} warnings, {} errors  Grade: {}",
        status,
        passed,
        warnings,
        errors,
        colored_grade(grade)
    )?;
    Ok(())
}

fn colored_grade(grade: Grade) -> ColoredString {
    let letter = grade.as_str();
    match grade {
        Grade::A => letter.green().bold(),
        Grade::B => letter.green(),
        Grade::C => letter.yellow(),
        Grade::D => letter.yellow().bold(),
        Grade::F => letter.red(),
    }
}

/// Write a batch report as text: a table of packages and the totals.
/// With `verbose`, every package's full report follows the table.
pub fn write_batch_text<W: Write>(out: &mut W, batch: &BatchReport, verbose: bool) -> anyhow::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        "skillgate".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    )?;
    writeln!(out)?;

    if batch.is_empty() {
        writeln!(out, "  {}", "No skills found".dimmed())?;
        writeln!(out)?;
        return Ok(());
    }

    let width = batch
        .skills
        .keys()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .max("Skill".len());

    writeln!(
        out,
        "  {:<width$}  {:>5}  {:>8}  {:>6}",
        "Skill".bold(),
        "Grade".bold(),
        "Warnings".bold(),
        "Errors".bold(),
        width = width
    )?;
    for (name, report) in &batch.skills {
        writeln!(
            out,
            "  {:<width$}  {:>5}  {:>8}  {:>6}",
            name,
            colored_grade(report.grade),
            report.warnings.len(),
            report.errors.len(),
            width = width
        )?;
    }
    writeln!(out)?;

    if verbose {
        for report in batch.skills.values() {
            write_text(out, report, true)?;
        }
    }

    let status = if batch.is_valid() {
        "✓ PASS".green()
    } else {
        "✗ FAIL".red()
    };
    writeln!(
        out,
        "  {}  {} skills, {} warnings, {} errors",
        status,
        batch.len(),
        batch.total_warnings,
        batch.total_errors
    )?;
    writeln!(out)?;
    Ok(())
}

/// List every issue code grouped by gate.
pub fn write_rules<W: Write>(out: &mut W) -> anyhow::Result<()> {
    for gate in GateKind::ALL {
        writeln!(out, "{}", gate.as_str().to_uppercase().bold())?;
        for code in Code::ALL.iter().filter(|c| c.gate() == gate) {
            writeln!(
                out,
                "  {}  {:<8} {}",
                code,
                code.severity().to_string(),
                code.description()
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}
