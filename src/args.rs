//! Command line configuration for the upgrade report.

use crate::reports::DEFAULT_PAGE_SIZE;
use crate::util::DisplayLocale;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// upgrade_report: summarize a semicolon-delimited export of plan upgrades.
///
/// Loads the export, normalizes its Brazilian-style money values and shows the
/// total upgrade value, the best sellers and the plan mix. Records can be
/// browsed page by page and everything can be exported to CSV and JSON.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    /// The export to load. Columns: period;client;vendor;process;plan;diff
    #[arg(long, env = "UPGRADES_CSV", default_value = "upgrades.csv")]
    file: PathBuf,

    /// Directory that exported reports are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Number formatting used for display.
    #[arg(long, value_enum, default_value_t = DisplayLocale::PtBr)]
    locale: DisplayLocale,

    /// Records per page when browsing.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// Load the file, print the dashboard and exit instead of showing the menu.
    #[arg(long)]
    no_interactive: bool,

    /// With --no-interactive, also write the report files.
    #[arg(long)]
    export: bool,
}

impl Args {
    pub fn file(&self) -> &PathBuf {
        &self.file
    }

    pub fn out_dir(&self) -> &PathBuf {
        &self.out_dir
    }

    pub fn locale(&self) -> DisplayLocale {
        self.locale
    }

    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn interactive(&self) -> bool {
        !self.no_interactive
    }

    pub fn export(&self) -> bool {
        self.export
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["upgrade_report"]).unwrap();
        assert_eq!(args.locale(), DisplayLocale::PtBr);
        assert_eq!(args.page_size(), 10);
        assert_eq!(args.log_level(), LevelFilter::INFO);
        assert!(args.interactive());
        assert!(!args.export());
    }

    #[test]
    fn explicit_values() {
        let args = Args::try_parse_from([
            "upgrade_report",
            "--file",
            "data/jan.csv",
            "--locale",
            "en",
            "--page-size",
            "0",
            "--no-interactive",
            "--export",
        ])
        .unwrap();
        assert_eq!(args.file(), &PathBuf::from("data/jan.csv"));
        assert_eq!(args.locale(), DisplayLocale::En);
        assert_eq!(args.page_size(), 1);
        assert!(!args.interactive());
        assert!(args.export());
    }

    #[test]
    fn rejects_unknown_locale() {
        assert!(Args::try_parse_from(["upgrade_report", "--locale", "fr"]).is_err());
    }
}
