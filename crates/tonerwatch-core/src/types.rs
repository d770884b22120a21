// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Tonerwatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QueryFieldError;

/// Identifier of one scheduled invocation, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A printer as declared in the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// IP address or hostname of the SNMP agent.
    #[serde(alias = "ip")]
    pub address: String,
    /// UDP port override (run-wide default otherwise).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Community string override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    /// Name of the variant table used for this printer.
    pub variant: String,
    /// Serial number; read from the device when absent or empty.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub serial: Option<String>,
    /// Free-text description shown in reports.
    #[serde(default)]
    pub description: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// A scalar value as fetched from, or derived for, a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
}

impl FieldValue {
    /// Integer view of the value. Text is accepted when it parses as one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One fetched (or failed) value for one field of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Symbolic field name, e.g. `black_toner`.
    pub field: String,
    /// Object identifier the raw value was read from.
    pub oid: String,
    /// Device-reported description of the supply, when the field has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Raw value of `oid`.
    pub raw: Option<FieldValue>,
    /// Raw value of the conversion's second identifier (capacity or addend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired: Option<FieldValue>,
    /// Value after the variant's conversion rule was applied.
    pub value: Option<FieldValue>,
    /// Set when the field could not be fetched or converted.
    pub error: Option<QueryFieldError>,
}

impl Reading {
    /// A reading that failed before any value was fetched.
    pub fn failed(field: &str, oid: &str, error: QueryFieldError) -> Self {
        Self {
            field: field.to_string(),
            oid: oid.to_string(),
            label: None,
            raw: None,
            paired: None,
            value: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Reachability of a device as seen by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceStatus {
    /// At least one field answered.
    Ok,
    /// No field answered.
    Timeout,
}

/// The per-device, per-run bundle of readings sent to the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Client tag from the run configuration.
    pub client: String,
    pub description: String,
    pub serial: Option<String>,
    pub address: String,
    pub variant: String,
    /// Version of the reporting program.
    pub version: String,
    pub status: DeviceStatus,
    pub timestamp: DateTime<Utc>,
    pub readings: Vec<Reading>,
}

impl ReportRecord {
    /// Look up a reading by field name.
    pub fn reading(&self, field: &str) -> Option<&Reading> {
        self.readings.iter().find(|r| r.field == field)
    }

    /// Readings that carry an error marker.
    pub fn failed_readings(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter().filter(|r| !r.is_ok())
    }
}
