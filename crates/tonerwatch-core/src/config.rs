// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration, loaded once from a JSON file at startup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MonitorError, Result};
use crate::types::Device;
use crate::variants;

/// Everything one run needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Client tag attached to every report.
    pub client: String,
    /// Token sent in the `Authorization` header of HTTP deliveries.
    #[serde(default)]
    pub token: String,
    /// Forward proxy for HTTP deliveries (all schemes). Empty means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Where reports go. Only required when reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryConfig>,
    /// Run-wide SNMP defaults.
    #[serde(default)]
    pub snmp: SnmpSettings,
    /// Printers polled by this run.
    pub printers: Vec<Device>,
}

/// Delivery strategy selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum DeliveryConfig {
    Http(HttpEndpoint),
    Email(SmtpSettings),
}

/// Collection endpoint reached by HTTP POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpEndpoint {
    pub url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

/// Mail transport for deployments without a reachable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    /// Defaults to the submission port of the chosen TLS mode.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
    pub to: Vec<String>,
    /// Use STARTTLS on a plain connection instead of implicit TLS.
    #[serde(default)]
    pub starttls: bool,
}

/// SNMP transport defaults, overridable per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpSettings {
    /// v2c community string.
    pub community: String,
    /// Agent UDP port.
    pub port: u16,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Extra attempts per identifier after the first failure.
    pub retries: u32,
}

impl Default for SnmpSettings {
    fn default() -> Self {
        Self {
            community: "public".into(),
            port: 161,
            timeout_ms: 3000,
            retries: 1,
        }
    }
}

impl SnmpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Longest pause between two attempts at the same identifier.
pub const RETRY_BACKOFF_CAP: Duration = Duration::from_secs(2);

fn default_http_timeout() -> u64 {
    30
}

impl RunConfig {
    /// Read, parse and validate the configuration file.
    ///
    /// Every failure maps to `MonitorError::Config`; a run never starts on a
    /// broken configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            printers = config.printers.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(text)
            .map_err(|e| MonitorError::Config(format!("malformed configuration: {e}")))?;
        if config.proxy.as_deref().is_some_and(|p| p.trim().is_empty()) {
            config.proxy = None;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.client.trim().is_empty() {
            return Err(MonitorError::Config("'client' must not be empty".into()));
        }
        if self.printers.is_empty() {
            return Err(MonitorError::Config("no printers configured".into()));
        }
        if self.snmp.timeout_ms == 0 {
            return Err(MonitorError::Config("'snmp.timeout_ms' must be positive".into()));
        }
        for (i, device) in self.printers.iter().enumerate() {
            if device.address.trim().is_empty() {
                return Err(MonitorError::Config(format!("printer #{i} has no address")));
            }
            // Unknown variants skip the device at run time rather than
            // failing the whole run.
            if variants::fields_for(&device.variant).is_err() {
                warn!(
                    address = %device.address,
                    variant = %device.variant,
                    "printer references an unknown variant"
                );
            }
        }
        match &self.delivery {
            Some(DeliveryConfig::Http(http)) => {
                if !(http.url.starts_with("http://") || http.url.starts_with("https://")) {
                    return Err(MonitorError::Config(format!(
                        "delivery url '{}' is not an http(s) URL",
                        http.url
                    )));
                }
            }
            Some(DeliveryConfig::Email(smtp)) => {
                if smtp.host.trim().is_empty() || smtp.to.is_empty() {
                    return Err(MonitorError::Config(
                        "email delivery needs 'host' and at least one 'to' address".into(),
                    ));
                }
            }
            None => {}
        }
        Ok(())
    }

    /// Upper bound for a whole run: every field of every device timing out
    /// on every attempt, with the longest backoff between attempts, plus
    /// slack for delivery.
    pub fn run_deadline(&self, fields_per_device: usize) -> Duration {
        let retries = u64::from(self.snmp.retries);
        let per_request_ms = self
            .snmp
            .timeout_ms
            .saturating_mul(retries + 1)
            .saturating_add(retries.saturating_mul(RETRY_BACKOFF_CAP.as_millis() as u64));
        // value, paired value and label per field, plus the serial read
        let requests = (self.printers.len() * (fields_per_device * 3 + 1)) as u64;
        Duration::from_millis(per_request_ms.saturating_mul(requests)) + Duration::from_secs(30)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"{
        "client": "ACME-01",
        "token": "s3cret",
        "proxy": "",
        "delivery": {"method": "http", "url": "https://collector.example/api/printer/"},
        "printers": [
            {"ip": "10.0.0.20", "serial": "3356XYZ", "description": "Reception", "variant": "xerox"},
            {"ip": "10.0.0.21", "serial": "", "description": "Office", "variant": "hpbw", "community": "private"}
        ]
    }"#;

    #[test]
    fn loads_sample_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.client, "ACME-01");
        assert_eq!(config.proxy, None);
        assert_eq!(config.snmp, SnmpSettings::default());
        assert_eq!(config.printers.len(), 2);
        assert_eq!(config.printers[1].community.as_deref(), Some("private"));
        assert!(matches!(
            config.delivery,
            Some(DeliveryConfig::Http(HttpEndpoint { timeout_secs: 30, .. }))
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = RunConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn empty_printer_list_is_rejected() {
        let err = RunConfig::from_json(r#"{"client": "A", "printers": []}"#).unwrap_err();
        assert!(err.to_string().contains("no printers"));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let text = r#"{
            "client": "A",
            "delivery": {"method": "http", "url": "ftp://example"},
            "printers": [{"ip": "10.0.0.1", "variant": "hp"}]
        }"#;
        assert!(matches!(
            RunConfig::from_json(text),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn unknown_variant_does_not_fail_loading() {
        let text = r#"{"client": "A", "printers": [{"ip": "10.0.0.1", "variant": "canon"}]}"#;
        assert!(RunConfig::from_json(text).is_ok());
    }

    #[test]
    fn email_delivery_parses() {
        let text = r#"{
            "client": "A",
            "delivery": {"method": "email", "host": "smtp.example", "from": "mon@example", "to": ["ops@example"]},
            "printers": [{"ip": "10.0.0.1", "variant": "hp"}]
        }"#;
        let config = RunConfig::from_json(text).unwrap();
        let Some(DeliveryConfig::Email(smtp)) = config.delivery else {
            panic!("expected email delivery");
        };
        assert_eq!(smtp.port, None);
        assert!(!smtp.starttls);
    }

    #[test]
    fn deadline_grows_with_devices() {
        let config = RunConfig::from_json(SAMPLE).unwrap();
        // 2 devices * (18 * 3 + 1) requests * (2 attempts * 3s + 1 backoff * 2s) + 30s
        assert_eq!(config.run_deadline(18), Duration::from_secs(910));
    }

    #[test]
    fn deadline_counts_backoff_of_every_retry() {
        let mut config = RunConfig::from_json(SAMPLE).unwrap();
        config.snmp.retries = 3;
        // 110 requests * (4 attempts * 3s + 3 backoffs * 2s) + 30s
        assert_eq!(config.run_deadline(18), Duration::from_secs(2010));

        config.snmp.retries = 0;
        // 110 requests * 3s + 30s
        assert_eq!(config.run_deadline(18), Duration::from_secs(360));
    }
}
