// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A reply that arrives after its request timed out must not poison the
// requests that follow it on the same session.

use std::sync::Arc;
use std::time::Duration;

use snmp2::Pdu;
use tokio::net::UdpSocket;

use tonerwatch_core::FieldValue;
use tonerwatch_snmp::retry::RetryConfig;
use tonerwatch_snmp::{DeviceQuery, SnmpSession};

const BASE: &str = "1.3.6.1.2.1.99";

/// Minimal BER TLV; every length used here is below 128.
fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag, content.len() as u8];
    out.extend_from_slice(content);
    out
}

fn integer(n: i64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let mut start = 0;
    while start < 7
        && ((bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0))
    {
        start += 1;
    }
    tlv(0x02, &bytes[start..])
}

/// v2c GetResponse carrying one Integer varbind.
fn response(req_id: i32, community: &[u8], oid: &[u8], value: i64) -> Vec<u8> {
    let varbind = tlv(0x30, &[tlv(0x06, oid), integer(value)].concat());
    let pdu = tlv(
        0xa2,
        &[
            integer(i64::from(req_id)),
            integer(0),
            integer(0),
            tlv(0x30, &varbind),
        ]
        .concat(),
    );
    tlv(0x30, &[integer(1), tlv(0x04, community), pdu].concat())
}

/// Agent answering `BASE.N` with Integer N. The very first request is
/// answered `first_delay` late.
async fn spawn_agent(first_delay: Duration) -> String {
    let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
    let addr = socket.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let mut buf = [0u8; 1500];
        let mut first = true;
        loop {
            let (len, peer) = socket.recv_from(&mut buf).await.unwrap();
            let request = Pdu::from_bytes(&buf[..len]).unwrap();
            let (oid, _) = request.varbinds.clone().next().unwrap();
            let oid_bytes = oid.as_bytes().to_vec();
            let last_arc = i64::from(*oid_bytes.last().unwrap());
            let reply = response(request.req_id, request.community, &oid_bytes, last_arc);

            let delay = if first { first_delay } else { Duration::ZERO };
            first = false;
            let socket = Arc::clone(&socket);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = socket.send_to(&reply, peer).await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn late_reply_does_not_fail_later_fields() {
    let addr = spawn_agent(Duration::from_millis(150)).await;
    let mut session = SnmpSession::connect(&addr, b"public").await.unwrap();
    let query = DeviceQuery::with_retry(
        Duration::from_millis(100),
        RetryConfig {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
    );

    // First attempt times out; the retry goes out on a fresh socket.
    let first = query.fetch(&mut session, &format!("{BASE}.1")).await;
    assert_eq!(first, Ok(FieldValue::Number(1)));

    // Let the late reply land.
    tokio::time::sleep(Duration::from_millis(200)).await;

    for n in 2..=6_i64 {
        let value = query.fetch(&mut session, &format!("{BASE}.{n}")).await;
        assert_eq!(value, Ok(FieldValue::Number(n)), "field {n}");
    }
}

#[tokio::test]
async fn prompt_agent_answers_every_field() {
    let addr = spawn_agent(Duration::ZERO).await;
    let mut session = SnmpSession::connect(&addr, b"public").await.unwrap();
    let query = DeviceQuery::with_retry(Duration::from_millis(500), RetryConfig::default());

    for n in 1..=3_i64 {
        let value = query.fetch(&mut session, &format!("{BASE}.{n}")).await;
        assert_eq!(value, Ok(FieldValue::Number(n)));
    }
}
