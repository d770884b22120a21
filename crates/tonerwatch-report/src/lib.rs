// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tonerwatch reporting: turns query outcomes into report records, renders
// them for humans, and hands them to a delivery strategy.

pub mod builder;
pub mod console;
pub mod deliver;
pub mod email;
pub mod http;

pub use builder::build;
pub use console::render_status;
pub use deliver::{Deliver, reporter_for};
pub use email::EmailReporter;
pub use http::{HttpReporter, HttpSettings};
