// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delivery strategy seam.

use async_trait::async_trait;

use tonerwatch_core::config::DeliveryConfig;
use tonerwatch_core::error::Result;
use tonerwatch_core::{ReportRecord, RunConfig};

use crate::email::EmailReporter;
use crate::http::{HttpReporter, HttpSettings};

/// Sends one report record somewhere. At most once, no replay.
#[async_trait]
pub trait Deliver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn deliver(&self, record: &ReportRecord) -> Result<()>;
}

/// The delivery strategy configured for this run, if any.
pub fn reporter_for(config: &RunConfig) -> Result<Option<Box<dyn Deliver>>> {
    let reporter: Box<dyn Deliver> = match &config.delivery {
        None => return Ok(None),
        Some(DeliveryConfig::Http(endpoint)) => {
            Box::new(HttpReporter::new(HttpSettings::new(config, endpoint))?)
        }
        Some(DeliveryConfig::Email(smtp)) => Box::new(EmailReporter::new(smtp)?),
    };
    Ok(Some(reporter))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"{
        "client": "acme",
        "token": "secret",
        "printers": [{"address": "10.0.0.5", "variant": "hp"}]
    }"#;

    fn with_delivery(delivery: &str) -> RunConfig {
        let mut value: serde_json::Value = serde_json::from_str(BASE).unwrap();
        value["delivery"] = serde_json::from_str(delivery).unwrap();
        RunConfig::from_json(&value.to_string()).unwrap()
    }

    #[test]
    fn no_delivery_configured() {
        let config = RunConfig::from_json(BASE).unwrap();
        assert!(reporter_for(&config).unwrap().is_none());
    }

    #[test]
    fn selects_http() {
        let config =
            with_delivery(r#"{"method": "http", "url": "https://collector.example/api/printers/"}"#);
        assert_eq!(reporter_for(&config).unwrap().unwrap().name(), "http");
    }

    #[tokio::test]
    async fn selects_email() {
        let config = with_delivery(
            r#"{"method": "email", "host": "smtp.example.org", "from": "tonerwatch@example.org", "to": ["ops@example.org"]}"#,
        );
        assert_eq!(reporter_for(&config).unwrap().unwrap().name(), "email");
    }
}
