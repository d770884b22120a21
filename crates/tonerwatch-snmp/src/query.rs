// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device query: fetch every identifier a variant needs from one printer.
//
// Each identifier is requested on its own, bounded by the per-request
// timeout and retried per the retry engine. A failed identifier marks its
// own Reading and nothing else; this function never fails as a whole.
// The one exception is a device that does not answer its first field at
// all: it is treated as down and nothing else is requested from it.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use tonerwatch_core::config::SnmpSettings;
use tonerwatch_core::variants::PRT_GENERAL_SERIAL_NUMBER;
use tonerwatch_core::{FieldSpec, FieldValue, QueryFieldError, Reading};

use crate::retry::{RetryConfig, RetryDecision, should_retry};
use crate::session::SnmpSource;

/// Raw readings of one device, before conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// One reading per field, in variant order. `value` is not yet set.
    pub readings: Vec<Reading>,
    /// Serial number read from the device, when it was asked for.
    pub serial: Option<String>,
}

impl QueryOutcome {
    /// Every field carries the same error, e.g. when no session could be opened.
    pub fn unreachable(fields: &[FieldSpec], error: QueryFieldError) -> Self {
        Self {
            readings: fields
                .iter()
                .map(|f| Reading::failed(f.field, &f.oid, error.clone()))
                .collect(),
            serial: None,
        }
    }

    pub fn answered(&self) -> usize {
        self.readings.iter().filter(|r| r.raw.is_some()).count()
    }
}

/// Per-request timeout and retry policy for field fetches.
#[derive(Debug, Clone)]
pub struct DeviceQuery {
    timeout: Duration,
    retry: RetryConfig,
}

impl DeviceQuery {
    pub fn new(settings: &SnmpSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            retry: RetryConfig::from(settings),
        }
    }

    pub fn with_retry(timeout: Duration, retry: RetryConfig) -> Self {
        Self { timeout, retry }
    }

    /// Fetch one identifier with timeout and retries.
    pub async fn fetch<S: SnmpSource>(
        &self,
        source: &mut S,
        oid: &str,
    ) -> Result<FieldValue, QueryFieldError> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, source.get(oid)).await {
                Ok(result) => result,
                Err(_) => Err(QueryFieldError::Timeout),
            };
            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match should_retry(&err, attempt, &self.retry) {
                RetryDecision::RetryAfter(delay) => {
                    debug!(oid, attempt, error = %err, "retrying identifier");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp(_) | RetryDecision::Exhausted => return Err(err),
            }
        }
    }

    /// Read one field: its value, the conversion's paired value, and the label.
    pub async fn read_field<S: SnmpSource>(&self, source: &mut S, spec: &FieldSpec) -> Reading {
        let raw = match self.fetch(source, &spec.oid).await {
            Ok(raw) => raw,
            Err(err) => {
                debug!(field = spec.field, oid = %spec.oid, error = %err, "field unavailable");
                return Reading::failed(spec.field, &spec.oid, err);
            }
        };

        let mut reading = Reading {
            field: spec.field.to_string(),
            oid: spec.oid.clone(),
            label: None,
            raw: Some(raw),
            paired: None,
            value: None,
            error: None,
        };

        if let Some(paired_oid) = spec.conversion.paired_oid() {
            match self.fetch(source, paired_oid).await {
                Ok(paired) => reading.paired = Some(paired),
                Err(err) => {
                    debug!(field = spec.field, oid = paired_oid, error = %err, "paired value unavailable");
                    reading.error = Some(err);
                }
            }
        }

        // Labels are cosmetic; a missing one never fails the field.
        if let Some(label_oid) = &spec.label_oid {
            reading.label = self
                .fetch(source, label_oid)
                .await
                .ok()
                .map(|v| v.to_string())
                .filter(|s| !s.trim().is_empty());
        }

        reading
    }

    /// Query every field of a device in order. `read_serial` also reads
    /// prtGeneralSerialNumber.
    #[instrument(skip_all, fields(fields = fields.len()))]
    pub async fn query<S: SnmpSource>(
        &self,
        source: &mut S,
        fields: &[FieldSpec],
        read_serial: bool,
    ) -> QueryOutcome {
        let mut readings = Vec::with_capacity(fields.len());
        for spec in fields {
            let reading = self.read_field(source, spec).await;
            let down = readings.is_empty() && reading.error == Some(QueryFieldError::Timeout);
            readings.push(reading);
            if down {
                warn!(oid = %spec.oid, "device does not answer; skipping remaining fields");
                readings.extend(
                    fields[1..]
                        .iter()
                        .map(|f| Reading::failed(f.field, &f.oid, QueryFieldError::Timeout)),
                );
                return QueryOutcome {
                    readings,
                    serial: None,
                };
            }
        }

        let serial = if read_serial {
            match self.fetch(source, PRT_GENERAL_SERIAL_NUMBER).await {
                Ok(value) => Some(value.to_string()).filter(|s| !s.trim().is_empty()),
                Err(err) => {
                    warn!(error = %err, "serial number could not be read");
                    None
                }
            }
        } else {
            None
        };

        let outcome = QueryOutcome { readings, serial };
        info!(
            answered = outcome.answered(),
            total = fields.len(),
            "device query finished"
        );
        outcome
    }

    /// Liveness check: does the device answer its first field?
    pub async fn ping<S: SnmpSource>(&self, source: &mut S, fields: &[FieldSpec]) -> bool {
        match fields.first() {
            Some(spec) => self.fetch(source, &spec.oid).await.is_ok(),
            None => false,
        }
    }
}
