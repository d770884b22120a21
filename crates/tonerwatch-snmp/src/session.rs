// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SNMP v2c transport.
//
// `SnmpSource` is the seam between the query logic and the wire: one GET of
// one identifier, answered with an owned `FieldValue`. `SnmpSession` is the
// UDP implementation on top of `snmp2::AsyncSession`.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use snmp2::{AsyncSession, Oid, Value};
use tracing::debug;

use tonerwatch_core::config::SnmpSettings;
use tonerwatch_core::{Device, FieldValue, QueryFieldError};

/// Something that answers SNMP GET requests.
#[async_trait]
pub trait SnmpSource: Send {
    /// Fetch the value of a single dotted object identifier.
    async fn get(&mut self, oid: &str) -> Result<FieldValue, QueryFieldError>;
}

/// Opens one `SnmpSource` per device.
#[async_trait]
pub trait Connector: Send + Sync {
    type Source: SnmpSource;

    async fn connect(&self, device: &Device) -> Result<Self::Source, QueryFieldError>;
}

/// Parse a dotted OID string ("1.3.6.1.2.1.1.5.0").
pub fn parse_oid(s: &str) -> Result<Oid<'static>, QueryFieldError> {
    let parts: Vec<u64> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| QueryFieldError::InvalidOid(s.to_string()))?;

    if parts.len() < 2 {
        return Err(QueryFieldError::InvalidOid(s.to_string()));
    }
    Oid::from(&parts).map_err(|_| QueryFieldError::InvalidOid(s.to_string()))
}

/// Convert an SNMP value into an owned report value.
///
/// noSuchObject, noSuchInstance, endOfMibView and NULL all mean the agent has
/// nothing at this identifier.
fn to_field_value(value: Value<'_>) -> Result<FieldValue, QueryFieldError> {
    match value {
        Value::Integer(n) => Ok(FieldValue::Number(n)),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => {
            Ok(FieldValue::Number(i64::from(n)))
        }
        Value::Counter64(n) => i64::try_from(n).map(FieldValue::Number).map_err(|_| {
            QueryFieldError::Unconvertible(format!("Counter64 {n} exceeds the reportable range"))
        }),
        Value::OctetString(bytes) => Ok(FieldValue::Text(
            String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .to_string(),
        )),
        Value::IpAddress(octets) => Ok(FieldValue::Text(Ipv4Addr::from(octets).to_string())),
        Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
            Err(QueryFieldError::NoSuchObject)
        }
        other => Ok(FieldValue::Text(format!("{other:?}"))),
    }
}

/// SNMP v2c session bound to one agent.
///
/// snmp2 reads exactly one datagram per request. When a request is dropped
/// mid-flight (the caller's timeout fired) its reply may still arrive later
/// and would be read as the answer to the next request. The session is
/// therefore reopened on a fresh socket before the next request whenever
/// the previous one did not complete.
pub struct SnmpSession {
    session: AsyncSession,
    target: String,
    community: Vec<u8>,
    next_req_id: i32,
    in_flight: bool,
}

impl SnmpSession {
    /// Open a UDP session. No packet is sent until the first request.
    pub async fn connect(target: &str, community: &[u8]) -> Result<Self, QueryFieldError> {
        Ok(Self {
            session: open(target, community, 1).await?,
            target: target.to_string(),
            community: community.to_vec(),
            next_req_id: 1,
            in_flight: false,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Replace the socket so stale replies to abandoned requests are never read.
    async fn reopen(&mut self) -> Result<(), QueryFieldError> {
        debug!(target = %self.target, req_id = self.next_req_id, "reopening SNMP session");
        self.session = open(&self.target, &self.community, self.next_req_id).await?;
        self.in_flight = false;
        Ok(())
    }
}

async fn open(target: &str, community: &[u8], req_id: i32) -> Result<AsyncSession, QueryFieldError> {
    AsyncSession::new_v2c(target, community, req_id)
        .await
        .map_err(|e| QueryFieldError::Transport(format!("cannot open SNMP session to {target}: {e}")))
}

#[async_trait]
impl SnmpSource for SnmpSession {
    async fn get(&mut self, oid: &str) -> Result<FieldValue, QueryFieldError> {
        let parsed = parse_oid(oid)?;
        if self.in_flight {
            self.reopen().await?;
        }
        debug!(target = %self.target, oid, req_id = self.next_req_id, "SNMP GET");

        // Cleared only if the request runs to completion.
        self.in_flight = true;
        self.next_req_id = self.next_req_id.wrapping_add(1);
        let result = self.session.get(&parsed).await;
        self.in_flight = false;

        let resp = match result {
            Ok(resp) => resp,
            Err(snmp2::Error::RequestIdMismatch) => {
                self.reopen().await?;
                return Err(QueryFieldError::Transport(format!(
                    "SNMP GET {oid}: stale reply, session reopened"
                )));
            }
            Err(e) => return Err(QueryFieldError::Transport(format!("SNMP GET {oid}: {e}"))),
        };

        let (_, value) = resp
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| QueryFieldError::Transport("empty SNMP response".into()))?;

        to_field_value(value)
    }
}

/// Connector for real agents, applying run-wide defaults to each device.
pub struct UdpConnector {
    defaults: SnmpSettings,
}

impl UdpConnector {
    pub fn new(defaults: SnmpSettings) -> Self {
        Self { defaults }
    }

    /// `host:port` for a device, bracketing bare IPv6 addresses.
    pub fn target_for(&self, device: &Device) -> String {
        let port = device.port.unwrap_or(self.defaults.port);
        let host = device.address.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        }
    }
}

#[async_trait]
impl Connector for UdpConnector {
    type Source = SnmpSession;

    async fn connect(&self, device: &Device) -> Result<SnmpSession, QueryFieldError> {
        let community = device
            .community
            .as_deref()
            .unwrap_or(&self.defaults.community);
        SnmpSession::connect(&self.target_for(device), community.as_bytes()).await
    }
}
