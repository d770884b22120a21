// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report builder: applies each field's conversion to its raw values and
// attaches device metadata. Pure; the capture time is passed in.

use chrono::{DateTime, Utc};

use tonerwatch_core::{Device, DeviceStatus, FieldSpec, FieldValue, Reading, ReportRecord};
use tonerwatch_snmp::QueryOutcome;
use tracing::debug;

/// Version stamped into every record.
pub const REPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the report record for one device.
///
/// Readings that already carry an error keep it and get no value. A reading
/// whose raw value cannot be converted gets an `Unconvertible` marker. A
/// failed total print count is filled in from the color and mono counts
/// when both of those were read.
pub fn build(
    device: &Device,
    client: &str,
    fields: &[FieldSpec],
    outcome: QueryOutcome,
    captured_at: DateTime<Utc>,
) -> ReportRecord {
    let status = if outcome.answered() > 0 {
        DeviceStatus::Ok
    } else {
        DeviceStatus::Timeout
    };

    let mut readings: Vec<Reading> = outcome
        .readings
        .into_iter()
        .map(|reading| {
            match fields.iter().find(|f| f.field == reading.field) {
                Some(spec) => convert(reading, spec),
                None => reading,
            }
        })
        .collect();
    fill_print_total(&mut readings);

    ReportRecord {
        client: client.to_string(),
        description: device.description.clone(),
        serial: device.serial.clone().or(outcome.serial),
        address: device.address.clone(),
        variant: device.variant.clone(),
        version: REPORTER_VERSION.to_string(),
        status,
        timestamp: captured_at,
        readings,
    }
}

fn convert(mut reading: Reading, spec: &FieldSpec) -> Reading {
    if reading.error.is_some() {
        reading.value = None;
        return reading;
    }
    let Some(raw) = &reading.raw else {
        return reading;
    };
    match spec.conversion.apply(raw, reading.paired.as_ref()) {
        Ok(value) => reading.value = Some(value),
        Err(err) => reading.error = Some(err),
    }
    reading
}

fn fill_print_total(readings: &mut [Reading]) {
    let count_of = |readings: &[Reading], field: &str| {
        readings
            .iter()
            .find(|r| r.field == field && r.is_ok())
            .and_then(|r| match r.value {
                Some(FieldValue::Number(n)) => Some(n),
                _ => None,
            })
    };
    let (Some(color), Some(mono)) = (
        count_of(readings, "print_color"),
        count_of(readings, "print_mono"),
    ) else {
        return;
    };
    let Some(total) = readings.iter_mut().find(|r| r.field == "print_count") else {
        return;
    };
    if total.is_ok() && total.value.is_some() {
        return;
    }
    debug!(color, mono, "print total derived from color and mono counts");
    total.value = Some(FieldValue::Number(color.saturating_add(mono)));
    total.error = None;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tonerwatch_core::{QueryFieldError, fields_for};

    use super::*;

    fn device(serial: Option<&str>) -> Device {
        Device {
            address: "10.0.0.5".into(),
            port: None,
            community: None,
            variant: "hpm426".into(),
            serial: serial.map(String::from),
            description: "Floor 2".into(),
        }
    }

    fn captured() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap()
    }

    fn answered(spec: &FieldSpec, raw: FieldValue, paired: Option<FieldValue>) -> Reading {
        Reading {
            field: spec.field.to_string(),
            oid: spec.oid.clone(),
            label: None,
            raw: Some(raw),
            paired,
            value: None,
            error: None,
        }
    }

    /// Every field answered; supplies at 750 of 3000.
    fn full_outcome(fields: &[FieldSpec]) -> QueryOutcome {
        let readings = fields
            .iter()
            .map(|spec| match spec.conversion.paired_oid() {
                Some(_) => answered(spec, FieldValue::Number(750), Some(FieldValue::Number(3000))),
                None if spec.field.starts_with("print_") => answered(spec, FieldValue::Number(48213), None),
                None => answered(spec, "HP".into(), None),
            })
            .collect();
        QueryOutcome {
            readings,
            serial: Some("PHB8K12345".into()),
        }
    }

    #[test]
    fn complete_query_yields_complete_values() {
        let fields = fields_for("hpm426").unwrap();
        let record = build(&device(None), "acme", &fields, full_outcome(&fields), captured());

        assert_eq!(record.status, DeviceStatus::Ok);
        assert_eq!(record.readings.len(), fields.len());
        assert!(record.readings.iter().all(|r| r.value.is_some() && r.is_ok()));
        assert_eq!(
            record.reading("black_toner").unwrap().value,
            Some(FieldValue::Number(25))
        );
        assert_eq!(record.serial.as_deref(), Some("PHB8K12345"));
        assert_eq!(record.client, "acme");
        assert_eq!(record.version, REPORTER_VERSION);
    }

    #[test]
    fn configured_serial_wins() {
        let fields = fields_for("hpm426").unwrap();
        let record = build(
            &device(Some("CFG-1")),
            "acme",
            &fields,
            full_outcome(&fields),
            captured(),
        );
        assert_eq!(record.serial.as_deref(), Some("CFG-1"));
    }

    #[test]
    fn errored_field_keeps_marker_and_no_value() {
        let fields = fields_for("hpm426").unwrap();
        let mut outcome = full_outcome(&fields);
        let meta = outcome.readings.iter_mut().find(|r| r.field == "meta").unwrap();
        *meta = Reading::failed("meta", &meta.oid, QueryFieldError::Timeout);

        let record = build(&device(None), "acme", &fields, outcome, captured());
        let meta = record.reading("meta").unwrap();
        assert_eq!(meta.value, None);
        assert_eq!(meta.error, Some(QueryFieldError::Timeout));
        assert_eq!(record.failed_readings().count(), 1);
        assert_eq!(record.status, DeviceStatus::Ok);
    }

    #[test]
    fn zero_capacity_is_unconvertible() {
        let fields = fields_for("hpm426").unwrap();
        let spec = fields.iter().find(|f| f.field == "black_toner").unwrap();
        let outcome = QueryOutcome {
            readings: vec![answered(spec, FieldValue::Number(750), Some(FieldValue::Number(0)))],
            serial: None,
        };

        let record = build(&device(None), "acme", &fields, outcome, captured());
        let toner = record.reading("black_toner").unwrap();
        assert_eq!(toner.value, None);
        assert!(matches!(toner.error, Some(QueryFieldError::Unconvertible(_))));
    }

    #[test]
    fn silent_device_is_timeout() {
        let fields = fields_for("xerox").unwrap();
        let outcome = QueryOutcome::unreachable(&fields, QueryFieldError::Timeout);
        let record = build(&device(None), "acme", &fields, outcome, captured());
        assert_eq!(record.status, DeviceStatus::Timeout);
        assert_eq!(record.failed_readings().count(), fields.len());
    }

    fn xerox_counts(total: Option<i64>, color: Option<i64>, mono: Option<i64>) -> Vec<Reading> {
        let fields = fields_for("xerox").unwrap();
        [("print_count", total), ("print_color", color), ("print_mono", mono)]
            .into_iter()
            .map(|(field, count)| {
                let spec = fields.iter().find(|f| f.field == field).unwrap();
                match count {
                    Some(n) => answered(spec, FieldValue::Number(n), None),
                    None => Reading::failed(field, &spec.oid, QueryFieldError::Timeout),
                }
            })
            .collect()
    }

    #[test]
    fn failed_total_is_color_plus_mono() {
        let fields = fields_for("xerox").unwrap();
        let outcome = QueryOutcome {
            readings: xerox_counts(None, Some(100), Some(200)),
            serial: None,
        };

        let record = build(&device(None), "acme", &fields, outcome, captured());
        let total = record.reading("print_count").unwrap();
        assert!(total.is_ok());
        assert_eq!(total.value, Some(FieldValue::Number(300)));
        assert_eq!(record.failed_readings().count(), 0);
    }

    #[test]
    fn total_stays_failed_without_both_parts() {
        let fields = fields_for("xerox").unwrap();
        let outcome = QueryOutcome {
            readings: xerox_counts(None, Some(100), None),
            serial: None,
        };

        let record = build(&device(None), "acme", &fields, outcome, captured());
        let total = record.reading("print_count").unwrap();
        assert_eq!(total.value, None);
        assert_eq!(total.error, Some(QueryFieldError::Timeout));
    }

    #[test]
    fn answered_total_is_kept() {
        let fields = fields_for("xerox").unwrap();
        let outcome = QueryOutcome {
            readings: xerox_counts(Some(1000), Some(100), Some(200)),
            serial: None,
        };

        let record = build(&device(None), "acme", &fields, outcome, captured());
        assert_eq!(
            record.reading("print_count").unwrap().value,
            Some(FieldValue::Number(1000))
        );
    }

    #[test]
    fn record_serializes_with_rfc3339_timestamp() {
        let fields = fields_for("hpm426").unwrap();
        let record = build(&device(None), "acme", &fields, full_outcome(&fields), captured());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2026-03-01T06:00:00Z");
        assert_eq!(json["status"], "OK");
    }
}
