use async_trait::async_trait;

use super::{MailError, MailMessage, Mailer};

/// Mailer used when SMTP is disabled: messages are written to the log.
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Mail delivery disabled, logging message instead"
        );
        Ok(())
    }
}
