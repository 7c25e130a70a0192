//! SMTP transport via lettre (STARTTLS relay)

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use super::{MailError, MailTransport, OutgoingMail};
use crate::config::SmtpConfig;

/// Sends multipart (text + HTML) mail through an authenticated relay
#[derive(Clone)]
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// Build the relay client; no connection is opened until the first send
    pub fn new(config: &SmtpConfig, from_name: &str, from_address: &str) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();
        let address = from_address
            .parse()
            .map_err(|_| MailError::InvalidAddress(from_address.to_string()))?;
        let from = Mailbox::new(Some(from_name.to_string()), address);
        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(mail.to.clone()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(mail.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(mail.html.clone()),
                    ),
            )?;

        let response = self.mailer.send(message).await?;
        tracing::debug!(to = %mail.to, code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}
