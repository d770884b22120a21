// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::runner::Mode;

#[derive(Parser, Debug)]
#[command(name = "tonerwatch", version)]
#[command(about = "Poll printer consumables over SNMP and report them")]
pub struct Cli {
    /// Path to the JSON run configuration
    #[arg(short, long, default_value = "printer_config.json")]
    pub config: PathBuf,

    /// Print each report to stdout instead of delivering it
    #[arg(long, conflicts_with = "ping")]
    pub debug: bool,

    /// Only check whether each printer answers
    #[arg(long)]
    pub ping: bool,

    /// File that log lines are appended to
    #[arg(long, default_value = "tonerwatch.log")]
    pub log_file: PathBuf,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,

    /// Overall run deadline in seconds (derived from the configuration if unset)
    #[arg(long, value_name = "SECONDS")]
    pub deadline: Option<u64>,

    /// List the supported printer variants and exit
    #[arg(long)]
    pub list_variants: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.ping {
            Mode::Ping
        } else if self.debug {
            Mode::Debug
        } else {
            Mode::Report
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_report_mode() {
        let cli = Cli::try_parse_from(["tonerwatch"]).unwrap();
        assert_eq!(cli.mode(), Mode::Report);
        assert_eq!(cli.config, PathBuf::from("printer_config.json"));
        assert_eq!(cli.log_file, PathBuf::from("tonerwatch.log"));
        assert!(!cli.verbose);
        assert_eq!(cli.deadline, None);
    }

    #[test]
    fn selects_debug_and_ping() {
        let cli = Cli::try_parse_from(["tonerwatch", "--debug", "-c", "site.json"]).unwrap();
        assert_eq!(cli.mode(), Mode::Debug);
        assert_eq!(cli.config, PathBuf::from("site.json"));

        let cli = Cli::try_parse_from(["tonerwatch", "--ping", "-v"]).unwrap();
        assert_eq!(cli.mode(), Mode::Ping);
        assert!(cli.verbose);
    }

    #[test]
    fn debug_and_ping_conflict() {
        assert!(Cli::try_parse_from(["tonerwatch", "--debug", "--ping"]).is_err());
    }
}
