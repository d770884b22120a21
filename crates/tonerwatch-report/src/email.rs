// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Email delivery over SMTP. The body carries the rendered status tree
// followed by the JSON record, so a human and a parser can both read it.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use tonerwatch_core::config::SmtpSettings;
use tonerwatch_core::error::{MonitorError, Result};
use tonerwatch_core::ReportRecord;

use crate::console::render_status;
use crate::deliver::Deliver;

pub struct EmailReporter {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailReporter {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let relay = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        };
        let mut builder = relay.map_err(|e| {
            MonitorError::Config(format!("cannot use SMTP relay '{}': {e}", settings.host))
        })?;

        if let Some(port) = settings.port {
            builder = builder.port(port);
        }
        if let (Some(user), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let from = mailbox(&settings.from)?;
        let to = settings
            .to
            .iter()
            .map(|addr| mailbox(addr))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    /// Compose the message for one record.
    pub fn compose(&self, record: &ReportRecord) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(format!("{} printer report: {}", record.client, record.description))
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }

        let body = format!(
            "{}\n\n{}\n",
            render_status(record),
            serde_json::to_string_pretty(record)?
        );
        builder
            .body(body)
            .map_err(|e| MonitorError::Delivery(format!("cannot compose message: {e}")))
    }
}

fn mailbox(addr: &str) -> Result<Mailbox> {
    addr.parse()
        .map_err(|e| MonitorError::Config(format!("invalid email address '{addr}': {e}")))
}

#[async_trait]
impl Deliver for EmailReporter {
    fn name(&self) -> &'static str {
        "email"
    }

    #[instrument(skip_all, fields(address = %record.address, recipients = self.to.len()))]
    async fn deliver(&self, record: &ReportRecord) -> Result<()> {
        let message = self.compose(record)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MonitorError::Delivery(format!("SMTP send failed: {e}")))?;
        info!(code = %response.code(), "report mailed");
        Ok(())
    }
}
