//! Outbound email for the kedai API.
//!
//! The [`Mailer`] trait is the seam between domain services and the actual
//! transport: production wires an SMTP transport via lettre, tests use the
//! generated [`MockMailer`] or [`NoopMailer`].

mod smtp;
mod templates;

pub use smtp::{SmtpConfig, SmtpMailer};
pub use templates::password_reset_email;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email message: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Transport(String),
}

/// Email content ready for sending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailContent {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Trait for email delivery backends.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &EmailContent) -> Result<(), EmailError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Mailer that logs instead of sending.
///
/// Used when SMTP is not configured, so local environments work without a
/// mail server.
#[derive(Debug, Clone, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: &EmailContent) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to_email,
            subject = %email.subject,
            "Email delivery disabled, dropping message"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
