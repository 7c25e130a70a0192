//! Console transport for development without an SMTP relay

use async_trait::async_trait;

use super::{MailError, MailTransport, OutgoingMail};

/// Logs outgoing mail instead of sending it
#[derive(Debug, Default, Clone)]
pub struct ConsoleTransport;

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            text = %mail.text,
            "Mail not sent (console transport)"
        );
        Ok(())
    }
}
