// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Tonerwatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for all Tonerwatch operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    // -- Startup --
    #[error("configuration error: {0}")]
    Config(String),

    // -- Per device --
    #[error("unknown printer variant '{variant}'")]
    UnknownVariant { variant: String },

    #[error("field query failed: {0}")]
    QueryField(#[from] QueryFieldError),

    #[error("delivery failed: {0}")]
    Delivery(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single field fetch.
///
/// Attached to the `Reading` it belongs to and serialized with the report so
/// the collection side can tell "unknown" apart from a real zero.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum QueryFieldError {
    #[error("request timed out")]
    Timeout,

    /// The agent answered with noSuchObject / noSuchInstance / endOfMibView.
    #[error("no such object on device")]
    NoSuchObject,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid object identifier '{0}'")]
    InvalidOid(String),

    #[error("value cannot be converted: {0}")]
    Unconvertible(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MonitorError>;
