// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run controller: one pass over the configured printers.
//
// For each device: variant lookup, connect, query, build, then deliver
// (report), print (debug) or only check reachability (ping). Devices run one
// after another; a failure on one never stops the next. The whole pass is
// bounded by an overall deadline.

use std::time::Duration;

use chrono::Utc;
use tracing::{Instrument, debug, error, info, info_span, warn};

use tonerwatch_core::{Device, ReportRecord, RunConfig, RunId, fields_for};
use tonerwatch_report::{Deliver, build, render_status};
use tonerwatch_snmp::{Connector, DeviceQuery, QueryOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Query and deliver every device.
    Report,
    /// Query and print to stdout; never deliver.
    Debug,
    /// Only check that each device answers.
    Ping,
}

/// Tally of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub devices: usize,
    /// Devices that were processed before the run ended.
    pub processed: usize,
    pub unknown_variant: usize,
    /// Devices whose record carries at least one errored field.
    pub incomplete: usize,
    pub delivered: usize,
    pub delivery_failed: usize,
    /// Ping mode: devices that did not answer.
    pub unreachable: usize,
    pub deadline_exceeded: bool,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        !self.deadline_exceeded
            && self.unknown_variant == 0
            && self.incomplete == 0
            && self.delivery_failed == 0
            && self.unreachable == 0
    }

    /// Process exit status: 0 when everything worked, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() { 0 } else { 1 }
    }
}

pub struct Runner<'a, C: Connector> {
    config: &'a RunConfig,
    connector: C,
    query: DeviceQuery,
    reporter: Option<&'a dyn Deliver>,
    deadline: Option<Duration>,
}

impl<'a, C: Connector> Runner<'a, C> {
    pub fn new(config: &'a RunConfig, connector: C, query: DeviceQuery) -> Self {
        Self {
            config,
            connector,
            query,
            reporter: None,
            deadline: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Option<&'a dyn Deliver>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Override the deadline derived from the configuration.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[cfg(test)]
    fn connector(&self) -> &C {
        &self.connector
    }

    fn deadline(&self) -> Duration {
        self.deadline.unwrap_or_else(|| {
            let widest = self
                .config
                .printers
                .iter()
                .filter_map(|d| fields_for(&d.variant).ok())
                .map(|fields| fields.len())
                .max()
                .unwrap_or(0);
            self.config.run_deadline(widest)
        })
    }

    /// Process every configured device once.
    pub async fn run(&self, mode: Mode, run_id: RunId) -> RunSummary {
        let mut summary = RunSummary {
            devices: self.config.printers.len(),
            ..Default::default()
        };
        let deadline = self.deadline();
        let span = info_span!("run", %run_id, ?mode, client = %self.config.client);

        let pass = tokio::time::timeout(deadline, self.run_devices(mode, &mut summary))
            .instrument(span.clone())
            .await;

        let _enter = span.enter();
        if pass.is_err() {
            summary.deadline_exceeded = true;
            error!(
                deadline_secs = deadline.as_secs(),
                processed = summary.processed,
                devices = summary.devices,
                "run deadline exceeded; remaining devices skipped"
            );
        }
        info!(
            processed = summary.processed,
            unknown_variant = summary.unknown_variant,
            incomplete = summary.incomplete,
            delivered = summary.delivered,
            delivery_failed = summary.delivery_failed,
            unreachable = summary.unreachable,
            "run finished"
        );
        summary
    }

    async fn run_devices(&self, mode: Mode, summary: &mut RunSummary) {
        for device in &self.config.printers {
            let span = info_span!("device", address = %device.address, variant = %device.variant);
            self.run_device(device, mode, summary).instrument(span).await;
            summary.processed += 1;
        }
    }

    async fn run_device(&self, device: &Device, mode: Mode, summary: &mut RunSummary) {
        let fields = match fields_for(&device.variant) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(error = %e, "skipping device");
                summary.unknown_variant += 1;
                return;
            }
        };

        let source = self.connector.connect(device).await;

        if mode == Mode::Ping {
            let reachable = match source {
                Ok(mut source) => self.query.ping(&mut source, &fields).await,
                Err(e) => {
                    debug!(error = %e, "connect failed");
                    false
                }
            };
            if reachable {
                info!("printer answers");
            } else {
                warn!("printer does not answer");
                summary.unreachable += 1;
            }
            return;
        }

        let outcome = match source {
            Ok(mut source) => {
                self.query
                    .query(&mut source, &fields, device.serial.is_none())
                    .await
            }
            Err(e) => {
                warn!(error = %e, "cannot open SNMP session");
                QueryOutcome::unreachable(&fields, e)
            }
        };

        let record = build(device, &self.config.client, &fields, outcome, Utc::now());
        let failed = record.failed_readings().count();
        if failed > 0 {
            warn!(failed, total = record.readings.len(), "report has errored fields");
            summary.incomplete += 1;
        }

        match mode {
            Mode::Debug => print_record(&record),
            Mode::Report => match self.reporter {
                Some(reporter) => match reporter.deliver(&record).await {
                    Ok(()) => summary.delivered += 1,
                    Err(e) => {
                        error!(via = reporter.name(), error = %e, "delivery failed");
                        summary.delivery_failed += 1;
                    }
                },
                None => {
                    error!("no delivery configured");
                    summary.delivery_failed += 1;
                }
            },
            Mode::Ping => {}
        }
    }
}

fn print_record(record: &ReportRecord) {
    println!("{}", render_status(record));
    match serde_json::to_string_pretty(record) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "cannot serialize record"),
    }
    println!("#########################################################");
}
