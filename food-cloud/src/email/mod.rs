//! Notification dispatch
//!
//! [`NotificationDispatcher`] renders a [`Notification`] from the HTML
//! templates loaded at construction and hands the message to a
//! [`MailTransport`]. OTP mails are sent with [`DispatchMode::MustSucceed`];
//! order confirmations with [`DispatchMode::BestEffort`].

pub mod console;
pub mod smtp;

pub use console::ConsoleTransport;
pub use smtp::SmtpTransport;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::OrderItem;
use thiserror::Error;

/// Template file for all OTP mails
pub const OTP_TEMPLATE: &str = "otp.html";
/// Template file for order confirmations
pub const ORDER_CONFIRMATION_TEMPLATE: &str = "order_confirmation.html";

/// A rendered message ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template missing or unreadable.
    #[error("Template error: {0}")]
    Template(String),
}

/// Delivers a rendered message
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Whether a dispatch failure aborts the calling operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Failure propagates as `MailError`
    MustSucceed,
    /// Failure is logged and swallowed
    BestEffort,
}

/// What to send
#[derive(Debug, Clone)]
pub enum Notification {
    RegistrationOtp {
        name: String,
        code: String,
    },
    ResendOtp {
        name: String,
        code: String,
    },
    PasswordResetOtp {
        name: String,
        code: String,
    },
    OrderConfirmation {
        full_name: String,
        order_id: String,
        total_amount: Decimal,
        currency: String,
        items: Vec<OrderItem>,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::RegistrationOtp { .. } => "registration_otp",
            Notification::ResendOtp { .. } => "resend_otp",
            Notification::PasswordResetOtp { .. } => "password_reset_otp",
            Notification::OrderConfirmation { .. } => "order_confirmation",
        }
    }
}

/// Renders notifications and hands them to the transport
pub struct NotificationDispatcher {
    otp_template: String,
    order_template: String,
    transport: Arc<dyn MailTransport>,
}

impl NotificationDispatcher {
    /// Load both templates from `template_dir`
    pub fn new(
        template_dir: impl AsRef<Path>,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self, MailError> {
        let dir = template_dir.as_ref();
        Ok(Self {
            otp_template: load_template(dir, OTP_TEMPLATE)?,
            order_template: load_template(dir, ORDER_CONFIRMATION_TEMPLATE)?,
            transport,
        })
    }

    /// Render `notification` addressed to `to`
    pub fn render(&self, to: &str, notification: &Notification) -> OutgoingMail {
        let (subject, text, html) = match notification {
            Notification::RegistrationOtp { name, code } => (
                "Verify Your YogasFood Account".to_string(),
                format!("Your OTP is {code}. It will expire in 10 minutes."),
                self.render_otp(name, code),
            ),
            Notification::ResendOtp { name, code } => (
                "Verify Your YogasFood Account - New OTP".to_string(),
                format!("Your new OTP is {code}. It will expire in 10 minutes."),
                self.render_otp(name, code),
            ),
            Notification::PasswordResetOtp { name, code } => (
                "Password Reset Request - YogasFood".to_string(),
                format!("Your password reset OTP is {code}. It will expire in 10 minutes."),
                self.render_otp(name, code),
            ),
            Notification::OrderConfirmation {
                full_name,
                order_id,
                total_amount,
                currency,
                items,
            } => {
                let rows: String = items
                    .iter()
                    .map(|item| item_row(item, currency))
                    .collect();
                let html = render_template(
                    &self.order_template,
                    &[
                        ("fullName", escape_html(full_name)),
                        ("orderId", escape_html(order_id)),
                        ("totalAmount", escape_html(&format_amount(*total_amount, currency))),
                        ("currency", escape_html(currency)),
                        ("itemsRows", rows),
                    ],
                );
                (
                    format!("Ihre Bestellbestätigung - {order_id}"),
                    format!("Ihre Bestellung {order_id} wurde bestätigt."),
                    html,
                )
            }
        };
        OutgoingMail {
            to: to.to_string(),
            subject,
            text,
            html,
        }
    }

    /// Render and deliver; transport failure is returned to the caller
    pub async fn send(&self, to: &str, notification: &Notification) -> Result<(), MailError> {
        let mail = self.render(to, notification);
        self.transport.deliver(&mail).await?;
        tracing::info!(to = %to, kind = notification.kind(), "Notification sent");
        Ok(())
    }

    /// [`send`](Self::send) under a dispatch mode
    pub async fn dispatch(
        &self,
        mode: DispatchMode,
        to: &str,
        notification: &Notification,
    ) -> Result<(), MailError> {
        match (self.send(to, notification).await, mode) {
            (Ok(()), _) => Ok(()),
            (Err(e), DispatchMode::MustSucceed) => Err(e),
            (Err(e), DispatchMode::BestEffort) => {
                tracing::warn!(
                    to = %to,
                    kind = notification.kind(),
                    error = %e,
                    "Best-effort notification failed"
                );
                Ok(())
            }
        }
    }

    fn render_otp(&self, name: &str, code: &str) -> String {
        render_template(
            &self.otp_template,
            &[("firstname", escape_html(name)), ("otp", escape_html(code))],
        )
    }
}

fn load_template(dir: &Path, name: &str) -> Result<String, MailError> {
    let path = dir.join(name);
    std::fs::read_to_string(&path)
        .map_err(|e| MailError::Template(format!("{}: {e}", path.display())))
}

/// Replace every `{{key}}` with its value; unknown placeholders stay verbatim
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// `12.5` + `CHF` → `12.50 CHF`
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{:.2} {currency}", amount.round_dp(2))
}

fn item_row(item: &OrderItem, currency: &str) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td style=\"text-align: right;\">{}</td>\
         <td style=\"text-align: right;\">{}</td></tr>",
        escape_html(&item.name),
        item.quantity,
        escape_html(&format_amount(item.price, currency)),
        escape_html(&format_amount(item.subtotal, currency)),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FailingTransport;

    #[async_trait]
    impl MailTransport for FailingTransport {
        async fn deliver(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
            Err(MailError::InvalidAddress("relay down".into()))
        }
    }

    #[derive(Default)]
    struct Capture(Mutex<Vec<OutgoingMail>>);

    #[async_trait]
    impl MailTransport for Capture {
        async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
            self.0.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn templates() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OTP_TEMPLATE), "Hi {{firstname}}, code {{otp}}").unwrap();
        std::fs::write(
            dir.path().join(ORDER_CONFIRMATION_TEMPLATE),
            "{{fullName}}|{{orderId}}|{{totalAmount}}|{{itemsRows}}|{{unknown}}",
        )
        .unwrap();
        dir
    }

    #[test]
    fn placeholders_substituted_and_unknown_kept() {
        let out = render_template(
            "a {{x}} b {{ y }} c {{z}} d {{",
            &[("x", "1".into()), ("y", "2".into())],
        );
        assert_eq!(out, "a 1 b 2 c {{z}} d {{");
    }

    #[test]
    fn amounts_have_two_decimals() {
        assert_eq!(format_amount(Decimal::new(125, 1), "CHF"), "12.50 CHF");
        assert_eq!(format_amount(Decimal::new(24, 0), "EUR"), "24.00 EUR");
    }

    #[test]
    fn missing_template_dir_fails_construction() {
        let result = NotificationDispatcher::new("/nonexistent/templates", Arc::new(Capture::default()));
        assert!(matches!(result, Err(MailError::Template(_))));
    }

    #[test]
    fn order_confirmation_renders_rows() {
        let dir = templates();
        let dispatcher = NotificationDispatcher::new(dir.path(), Arc::new(Capture::default())).unwrap();
        let mail = dispatcher.render(
            "anna@x.com",
            &Notification::OrderConfirmation {
                full_name: "Anna <Muster>".into(),
                order_id: "ORD-20260101-ABC123".into(),
                total_amount: Decimal::new(2400, 2),
                currency: "CHF".into(),
                items: vec![OrderItem {
                    name: "Curry".into(),
                    quantity: 2,
                    price: Decimal::new(1200, 2),
                    subtotal: Decimal::new(2400, 2),
                }],
            },
        );
        assert_eq!(mail.subject, "Ihre Bestellbestätigung - ORD-20260101-ABC123");
        assert!(mail.html.starts_with("Anna &lt;Muster&gt;|ORD-20260101-ABC123|24.00 CHF|<tr>"));
        assert!(mail.html.contains("<td>Curry</td><td>2</td>"));
        assert!(mail.html.ends_with("|{{unknown}}"));
    }

    #[tokio::test]
    async fn otp_mail_goes_through_transport() {
        let dir = templates();
        let capture = Arc::new(Capture::default());
        let dispatcher = NotificationDispatcher::new(dir.path(), capture.clone()).unwrap();
        dispatcher
            .dispatch(
                DispatchMode::MustSucceed,
                "anna@x.com",
                &Notification::ResendOtp {
                    name: "Anna Muster".into(),
                    code: "123456".into(),
                },
            )
            .await
            .unwrap();
        let sent = capture.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Verify Your YogasFood Account - New OTP");
        assert_eq!(sent[0].html, "Hi Anna Muster, code 123456");
        assert!(sent[0].text.contains("123456"));
    }

    #[tokio::test]
    async fn dispatch_modes() {
        let dir = templates();
        let dispatcher = NotificationDispatcher::new(dir.path(), Arc::new(FailingTransport)).unwrap();
        let note = Notification::RegistrationOtp {
            name: "A".into(),
            code: "111111".into(),
        };
        assert!(
            dispatcher
                .dispatch(DispatchMode::MustSucceed, "a@x.com", &note)
                .await
                .is_err()
        );
        assert!(
            dispatcher
                .dispatch(DispatchMode::BestEffort, "a@x.com", &note)
                .await
                .is_ok()
        );
    }
}
