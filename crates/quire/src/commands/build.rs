//! `quire build` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_site::{BuildReport, Pipeline};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Include items marked `draft: true`.
    #[arg(long)]
    drafts: bool,

    /// Ignore the render cache and re-render every item.
    #[arg(long)]
    full_rebuild: bool,

    /// Disable the render cache entirely.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output (show INFO logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            include_drafts: self.drafts.then_some(true),
            full_rebuild: self.full_rebuild.then_some(true),
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(path = ?config.config_path, "Loaded configuration");

        output.info(&format!(
            "Source: {}",
            config.content_resolved.source_dir.display()
        ));

        let built = Pipeline::new(&config)?.build()?;
        print_report(output, &built.report);
        Ok(())
    }
}

fn print_report(output: &Output, report: &BuildReport) {
    output.heading("Items");
    for line in count_lines(report) {
        output.info(&line);
    }
    output.info(&format!(
        "Cache: {} hit(s), {} miss(es)",
        report.cache_hits, report.cache_misses
    ));

    for skipped in &report.skipped {
        output.warning(&format!(
            "Skipped {}: {}",
            skipped.path.display(),
            skipped.reason
        ));
    }
    for warning in &report.warnings {
        output.warning(&format!("Warning: {warning}"));
    }

    output.success(&format!("Built {} item(s)", report.total()));
}

/// One aligned line per type, plus the excluded drafts when there are any.
fn count_lines(report: &BuildReport) -> Vec<String> {
    let width = report.counts.keys().map(String::len).max().unwrap_or(0);
    let mut lines: Vec<String> = report
        .counts
        .iter()
        .map(|(kind, count)| format!("  {kind:<width$}  {count}"))
        .collect();
    if report.drafts_excluded > 0 {
        lines.push(format!("  ({} draft(s) excluded)", report.drafts_excluded));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: BuildArgs,
    }

    #[test]
    fn test_parse_flags() {
        let cli = TestCli::parse_from([
            "quire",
            "--config",
            "site/quire.toml",
            "-s",
            "notes",
            "--drafts",
            "--no-cache",
            "-v",
        ]);

        assert_eq!(cli.args.config, Some(PathBuf::from("site/quire.toml")));
        assert_eq!(cli.args.source_dir, Some(PathBuf::from("notes")));
        assert!(cli.args.drafts);
        assert!(!cli.args.full_rebuild);
        assert!(cli.args.no_cache);
        assert!(cli.args.verbose);
    }

    #[test]
    fn test_count_lines() {
        let mut report = BuildReport::default();
        report.counts.insert("post".to_owned(), 12);
        report.counts.insert("bookmark".to_owned(), 3);
        report.drafts_excluded = 2;

        assert_eq!(
            count_lines(&report),
            [
                "  bookmark  3",
                "  post      12",
                "  (2 draft(s) excluded)",
            ]
        );
    }

    #[test]
    fn test_count_lines_empty() {
        assert!(count_lines(&BuildReport::default()).is_empty());
    }
}
