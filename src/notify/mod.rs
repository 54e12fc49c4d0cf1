pub mod mail;

use std::sync::Arc;

use async_trait::async_trait;

pub use mail::{Email, LogMailer, Mailer, MailerError, SmtpMailer};

use crate::models::User;

/// Side effects fired after a credential change has been persisted
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_password_change(&self, user: &User) -> Result<(), MailerError>;

    async fn notify_email_change(&self, user: &User, old_email: &str) -> Result<(), MailerError>;
}

/// Sends change notifications as email through a [`Mailer`]
pub struct EmailNotifier {
    mailer: Arc<dyn Mailer>,
}

impl EmailNotifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify_password_change(&self, user: &User) -> Result<(), MailerError> {
        self.mailer.send(Email::password_changed(&user.email)).await
    }

    /// Both the new and the previous address are told about the change.
    async fn notify_email_change(&self, user: &User, old_email: &str) -> Result<(), MailerError> {
        self.mailer
            .send(Email::email_changed(&user.email, old_email, &user.email))
            .await?;
        self.mailer
            .send(Email::email_changed(old_email, old_email, &user.email))
            .await
    }
}
