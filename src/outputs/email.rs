//! SMTP delivery of the rendered report.
//!
//! Uses an authenticated STARTTLS relay (port 587 by default). A failed
//! delivery is returned to the orchestrator as a [`NotifyError`]; it never
//! prevents the seen set from being saved.

use super::Notifier;
use super::report::render;
use crate::config::MailConfig;
use crate::error::NotifyError;
use crate::models::AcceptedItem;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::fmt;
use tracing::{info, instrument};

/// Mails reports through an SMTP relay.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    greeting_name: Option<String>,
}

impl SmtpNotifier {
    pub fn new(mail: &MailConfig, greeting_name: Option<String>) -> Result<Self, NotifyError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_server)?
            .port(mail.smtp_port)
            .credentials(Credentials::new(
                mail.username.clone(),
                mail.password.clone(),
            ))
            .build();

        Ok(Self {
            mailer,
            from: mail.from.clone(),
            to: mail.to.clone(),
            greeting_name,
        })
    }

    /// Build the message without sending it.
    pub fn compose(&self, items: &[AcceptedItem]) -> Result<Message, NotifyError> {
        let report = render(items, self.greeting_name.as_deref());
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(report.subject)
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        Ok(builder.body(report.body)?)
    }
}

impl fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("greeting_name", &self.greeting_name)
            .finish_non_exhaustive()
    }
}

impl Notifier for SmtpNotifier {
    #[instrument(level = "info", skip_all, fields(items = items.len(), recipients = self.to.len()))]
    async fn notify(&self, items: &[AcceptedItem]) -> Result<(), NotifyError> {
        let message = self.compose(items)?;
        let response = self.mailer.send(message).await?;
        info!(code = %response.code(), "Report mailed");
        Ok(())
    }
}
