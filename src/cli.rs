//! Command-line interface for skillgate.

use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::batch;
use crate::config::{self, Config};
use crate::gates::{GateKind, Runner};
use crate::report;
use crate::skill::Package;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Skill package quality gate.
///
/// Validates skill packages (a directory holding a SKILL.md document and
/// optional reference files) against structure, content, quality and
/// integration rules. Every finding carries a stable code, a message and a
/// suggested fix.
#[derive(Parser, Debug)]
#[command(name = "skillgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Skill to validate (a directory name or path under --root)
    #[arg(required_unless_present_any = ["all", "list_rules"])]
    pub name: Option<String>,

    /// Directory containing the skill packages
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Validate every skill under --root
    #[arg(short, long, conflicts_with = "name")]
    pub all: bool,

    /// Only report one gate: structure, content, quality or integration
    #[arg(short, long)]
    pub gate: Option<GateKind>,

    /// Include passed checks in text output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// List every rule code and exit
    #[arg(long)]
    pub list_rules: bool,

    /// Path to a config YAML file (default: auto-discover in --root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Number of worker threads for --all (default: one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Load the config given on the command line, or discover one in `root`.
fn load_config(explicit: Option<&Path>, root: &Path) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Config::discover(root),
    };

    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Config::parse_file(&path)?
        }
        None => Config::default(),
    };

    config::validate(&config)?;
    Ok(config)
}

/// Run the command and return the process exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.list_rules {
        report::write_rules(&mut out)?;
        return Ok(EXIT_SUCCESS);
    }

    let config = load_config(cli.config.as_deref(), &cli.root)?;
    let runner = Runner::new(config)?.only(cli.gate);

    let valid = if cli.all {
        let batch = batch::run_batch(&cli.root, &runner, cli.jobs)?;
        if cli.json {
            report::write_batch_json(&mut out, &batch)?;
        } else {
            report::write_batch_text(&mut out, &batch, cli.verbose)?;
        }
        batch.is_valid()
    } else {
        let name = match cli.name.as_deref() {
            Some(name) => name,
            None => anyhow::bail!("a skill name is required unless --all is given"),
        };
        let package = Package::resolve(&cli.root, name);
        let report = runner.run(&package);
        if cli.json {
            report::write_json(&mut out, &report)?;
        } else {
            report::write_text(&mut out, &report, cli.verbose)?;
        }
        report.is_valid()
    };
    out.flush()?;

    if valid {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_single() {
        let cli = Cli::try_parse_from(["skillgate", "foo", "--gate", "quality", "--json"]).unwrap();
        assert_eq!(cli.name.as_deref(), Some("foo"));
        assert_eq!(cli.gate, Some(GateKind::Quality));
        assert!(cli.json);
        assert!(!cli.all);
    }

    #[test]
    fn test_name_required_without_all() {
        assert!(Cli::try_parse_from(["skillgate"]).is_err());
        assert!(Cli::try_parse_from(["skillgate", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["skillgate", "--list-rules"]).is_ok());
    }

    #[test]
    fn test_unknown_gate_rejected() {
        assert!(Cli::try_parse_from(["skillgate", "foo", "--gate", "style"]).is_err());
    }

    #[test]
    fn test_discovered_config_is_validated() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("skillgate.yaml"),
            "max_lines: 100\nideal_lines: 150\n",
        )
        .unwrap();
        let err = load_config(None, temp.path()).unwrap_err();
        assert!(err.to_string().contains("ideal_lines"));
    }

    #[test]
    fn test_default_config_without_file() {
        let temp = TempDir::new().unwrap();
        let config = load_config(None, temp.path()).unwrap();
        assert_eq!(config.document, "SKILL.md");
    }
}
