// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tonerwatch core: domain types, error definitions, run configuration and the
// static printer variant tables shared across all crates.

pub mod config;
pub mod conversion;
pub mod error;
pub mod types;
pub mod variants;

pub use config::RunConfig;
pub use conversion::Conversion;
pub use error::{MonitorError, QueryFieldError};
pub use types::*;
pub use variants::{FieldSpec, fields_for, variant_names};
