// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tonerwatch: printer consumable poller and reporter.
//
// Entry point. Parses the command line, initialises logging, loads the run
// configuration and performs one pass over the configured printers.
// Exit status: 0 all good, 1 some device or delivery failed, 2 bad
// configuration.

mod cli;
mod logging;
mod runner;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use tonerwatch_core::{RunConfig, RunId, variant_names};
use tonerwatch_report::reporter_for;
use tonerwatch_snmp::{DeviceQuery, UdpConnector};

use cli::Cli;
use runner::{Mode, Runner};

const CONFIG_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_variants {
        for name in variant_names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(&cli.log_file, cli.verbose) {
        eprintln!("cannot open log file {}: {e}", cli.log_file.display());
        return ExitCode::from(CONFIG_ERROR);
    }

    let run_id = RunId::new();
    let mode = cli.mode();
    info!(%run_id, ?mode, version = env!("CARGO_PKG_VERSION"), "Tonerwatch starting");

    let config = match RunConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %cli.config.display(), error = %e, "configuration rejected");
            return ExitCode::from(CONFIG_ERROR);
        }
    };

    let reporter = if mode == Mode::Report {
        match reporter_for(&config) {
            Ok(Some(reporter)) => Some(reporter),
            Ok(None) => {
                error!("report mode needs a 'delivery' section in the configuration");
                return ExitCode::from(CONFIG_ERROR);
            }
            Err(e) => {
                error!(error = %e, "cannot set up delivery");
                return ExitCode::from(CONFIG_ERROR);
            }
        }
    } else {
        None
    };

    let mut runner = Runner::new(
        &config,
        UdpConnector::new(config.snmp.clone()),
        DeviceQuery::new(&config.snmp),
    )
    .with_reporter(reporter.as_deref());
    if let Some(secs) = cli.deadline {
        runner = runner.with_deadline(Duration::from_secs(secs));
    }

    let summary = runner.run(mode, run_id).await;
    ExitCode::from(summary.exit_code())
}
