// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory SNMP agents.
//
// Answers GETs from a fixed table, so query, report and run logic can be
// exercised without a printer on the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tonerwatch_core::{Device, FieldValue, QueryFieldError};

use crate::session::{Connector, SnmpSource};

#[derive(Debug, Clone)]
enum Response {
    Value(FieldValue),
    Fail(QueryFieldError),
    /// Never answers; the caller's timeout fires.
    Hang,
}

/// A scripted agent. Identifiers without an entry answer `NoSuchObject`,
/// or never answer at all for a `silent` agent.
#[derive(Debug, Clone, Default)]
pub struct MemoryAgent {
    responses: HashMap<String, Response>,
    requests: Arc<Mutex<Vec<String>>>,
    silent: bool,
}

impl MemoryAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// An agent that never answers unscripted identifiers, like a powered-off
    /// printer.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    /// Answer `oid` with `value`.
    pub fn with(mut self, oid: &str, value: impl Into<FieldValue>) -> Self {
        self.responses
            .insert(oid.to_string(), Response::Value(value.into()));
        self
    }

    /// Answer `oid` with an error.
    pub fn failing(mut self, oid: &str, error: QueryFieldError) -> Self {
        self.responses.insert(oid.to_string(), Response::Fail(error));
        self
    }

    /// Never answer `oid`.
    pub fn hanging(mut self, oid: &str) -> Self {
        self.responses.insert(oid.to_string(), Response::Hang);
        self
    }

    /// Every identifier requested so far, in order. Shared between clones.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// How many times `oid` was requested.
    pub fn request_count(&self, oid: &str) -> usize {
        self.requests().iter().filter(|r| *r == oid).count()
    }
}

#[async_trait]
impl SnmpSource for MemoryAgent {
    async fn get(&mut self, oid: &str) -> Result<FieldValue, QueryFieldError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(oid.to_string());
        }
        match self.responses.get(oid).cloned() {
            Some(Response::Value(value)) => Ok(value),
            Some(Response::Fail(error)) => Err(error),
            Some(Response::Hang) => std::future::pending().await,
            None if self.silent => std::future::pending().await,
            None => Err(QueryFieldError::NoSuchObject),
        }
    }
}

/// Hands out `MemoryAgent`s by device address. Unknown addresses fail to
/// connect with a transport error.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    agents: HashMap<String, MemoryAgent>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, address: &str, agent: MemoryAgent) -> Self {
        self.agents.insert(address.to_string(), agent);
        self
    }

    pub fn agent(&self, address: &str) -> Option<&MemoryAgent> {
        self.agents.get(address)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Source = MemoryAgent;

    async fn connect(&self, device: &Device) -> Result<MemoryAgent, QueryFieldError> {
        self.agents.get(&device.address).cloned().ok_or_else(|| {
            QueryFieldError::Transport(format!("no route to {}", device.address))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_values_and_missing_objects() {
        let mut agent = MemoryAgent::new()
            .with("1.3.6.1.2.1.1.5.0", "printer-01")
            .failing("1.3.6.1.2.1.1.1.0", QueryFieldError::Timeout);

        assert_eq!(
            agent.get("1.3.6.1.2.1.1.5.0").await.unwrap(),
            FieldValue::Text("printer-01".into())
        );
        assert_eq!(
            agent.get("1.3.6.1.2.1.1.1.0").await.unwrap_err(),
            QueryFieldError::Timeout
        );
        assert_eq!(
            agent.get("1.3.6.1.9").await.unwrap_err(),
            QueryFieldError::NoSuchObject
        );
        assert_eq!(agent.requests().len(), 3);
    }

    #[tokio::test]
    async fn clones_share_request_log() {
        let agent = MemoryAgent::new().with("1.3.6.1.2.1.1.5.0", 1_i64);
        let mut clone = agent.clone();
        clone.get("1.3.6.1.2.1.1.5.0").await.unwrap();
        assert_eq!(agent.request_count("1.3.6.1.2.1.1.5.0"), 1);
    }
}
