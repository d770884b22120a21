// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tonerwatch SNMP: v2c transport over UDP, the per-identifier retry policy,
// and the device query that turns a variant's field list into raw readings.
// In-memory agents stand in for printers in tests.

pub mod memory;
pub mod query;
pub mod retry;
pub mod session;

pub use memory::{MemoryAgent, MemoryConnector};
pub use query::{DeviceQuery, QueryOutcome};
pub use session::{Connector, SnmpSession, SnmpSource, UdpConnector};
