use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Address error: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Plain-text notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn password_changed(to: &str) -> Self {
        let body = format!(
            r#"Hi,

The password for your account ({to}) was just changed.

If you made this change, no further action is needed.
If you did not, reset your password right away and contact an administrator.
"#,
        );

        Self {
            to: to.to_string(),
            subject: "Your password has been changed".into(),
            body,
        }
    }

    pub fn email_changed(to: &str, old_email: &str, new_email: &str) -> Self {
        let body = format!(
            r#"Hi,

The email address for your account was changed from {old_email} to {new_email}.

If you made this change, no further action is needed.
If you did not, contact an administrator right away.
"#,
        );

        Self {
            to: to.to_string(),
            subject: "Your email address has been changed".into(),
            body,
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailerError>;
}

/// Writes outgoing mail to the log instead of delivering it
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        tracing::info!(to = %email.to, subject = %email.subject, "mail delivery disabled, not sending");
        tracing::debug!("{}", email.body);
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, from: &str) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Ok(Self {
            transport,
            from: from.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse()?)
            .subject(email.subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(|e| MailerError::Unknown(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::SmtpError(e.to_string()))?;

        Ok(())
    }
}
