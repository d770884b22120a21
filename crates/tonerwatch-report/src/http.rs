// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP delivery: POST the JSON record to the collection endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Proxy};
use tracing::{info, instrument};

use tonerwatch_core::config::HttpEndpoint;
use tonerwatch_core::error::{MonitorError, Result};
use tonerwatch_core::{ReportRecord, RunConfig};

use crate::deliver::Deliver;

const USER_AGENT: &str = concat!("tonerwatch/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error response body kept in the error message.
const BODY_EXCERPT: usize = 200;

/// Everything the HTTP reporter needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub url: String,
    pub token: String,
    /// Forward proxy for all schemes. `None` connects directly.
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl HttpSettings {
    pub fn new(config: &RunConfig, endpoint: &HttpEndpoint) -> Self {
        Self {
            url: endpoint.url.clone(),
            token: config.token.clone(),
            proxy: config.proxy.clone(),
            timeout: Duration::from_secs(endpoint.timeout_secs),
        }
    }
}

/// Posts report records as JSON with token authentication.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: Client,
    url: String,
    token: String,
}

impl HttpReporter {
    pub fn new(settings: HttpSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT);

        builder = match &settings.proxy {
            Some(proxy) => builder.proxy(Proxy::all(proxy).map_err(|e| {
                MonitorError::Config(format!("invalid proxy '{proxy}': {e}"))
            })?),
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| MonitorError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: settings.url,
            token: settings.token,
        })
    }
}

#[async_trait]
impl Deliver for HttpReporter {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip_all, fields(url = %self.url, address = %record.address))]
    async fn deliver(&self, record: &ReportRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .json(record)
            .send()
            .await
            .map_err(|e| MonitorError::Delivery(format!("POST {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(BODY_EXCERPT).collect();
            return Err(MonitorError::Delivery(format!(
                "endpoint returned {status}: {excerpt}"
            )));
        }

        info!(status = status.as_u16(), "report delivered");
        Ok(())
    }
}
