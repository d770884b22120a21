// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unit conversion rules turning raw SNMP values into report values.
//
// Percentages are rounded half-up on exact integer arithmetic, so
// 250 of 1000 is 25 and 1 of 8 (12.5) is 13.

use crate::error::QueryFieldError;
use crate::types::FieldValue;

/// Printer-MIB sentinel values of `prtMarkerSuppliesLevel` (RFC 3805).
pub const SUPPLY_LEVEL_STATES: &[(i64, &str)] = &[(-1, "other"), (-2, "unknown"), (-3, "ok")];

/// How a raw value becomes the reported value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Reported as fetched.
    Identity,
    /// `raw / capacity * 100`, capacity read from a second identifier.
    Percentage { capacity_oid: String },
    /// Small integer codes mapped to named states. Unmapped codes pass through.
    Status { codes: &'static [(i64, &'static str)] },
    /// `raw + addend`, addend read from a second identifier.
    Sum { addend_oid: String },
}

impl Conversion {
    /// The second identifier this rule needs, if any.
    pub fn paired_oid(&self) -> Option<&str> {
        match self {
            Self::Percentage { capacity_oid } => Some(capacity_oid),
            Self::Sum { addend_oid } => Some(addend_oid),
            Self::Identity | Self::Status { .. } => None,
        }
    }

    /// Apply the rule. `paired` must be present when `paired_oid` is.
    pub fn apply(
        &self,
        raw: &FieldValue,
        paired: Option<&FieldValue>,
    ) -> Result<FieldValue, QueryFieldError> {
        match self {
            Self::Identity => Ok(match raw {
                FieldValue::Text(s) => FieldValue::Text(s.trim_end_matches('\0').to_string()),
                other => other.clone(),
            }),
            Self::Percentage { .. } => {
                let remaining = numeric(raw, "supply level")?;
                if remaining < 0 {
                    return Ok(decode(remaining, SUPPLY_LEVEL_STATES));
                }
                let capacity = numeric(required(paired)?, "supply capacity")?;
                percentage(remaining, capacity)
                    .map(FieldValue::Number)
                    .ok_or_else(|| {
                        QueryFieldError::Unconvertible(format!("supply capacity is {capacity}"))
                    })
            }
            Self::Status { codes } => Ok(match raw.as_i64() {
                Some(code) => decode(code, codes),
                None => raw.clone(),
            }),
            Self::Sum { .. } => {
                let base = numeric(raw, "counter")?;
                let addend = numeric(required(paired)?, "addend counter")?;
                Ok(FieldValue::Number(base.saturating_add(addend)))
            }
        }
    }
}

/// Percentage of `capacity` that `remaining` represents, rounded half-up.
///
/// Returns `None` for a non-positive capacity. Values above capacity are not
/// clamped.
pub fn percentage(remaining: i64, capacity: i64) -> Option<i64> {
    if capacity <= 0 {
        return None;
    }
    let num = i128::from(remaining) * 200 + i128::from(capacity);
    let den = i128::from(capacity) * 2;
    i64::try_from(num.div_euclid(den)).ok()
}

fn decode(code: i64, codes: &[(i64, &str)]) -> FieldValue {
    codes
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| FieldValue::Text((*name).to_string()))
        .unwrap_or(FieldValue::Number(code))
}

fn numeric(value: &FieldValue, what: &str) -> Result<i64, QueryFieldError> {
    value
        .as_i64()
        .ok_or_else(|| QueryFieldError::Unconvertible(format!("{what} '{value}' is not numeric")))
}

fn required(paired: Option<&FieldValue>) -> Result<&FieldValue, QueryFieldError> {
    paired.ok_or_else(|| QueryFieldError::Unconvertible("paired value missing".into()))
}
