//! Email module: the notification sink behind invitation delivery and feed
//! broadcasts.

pub mod templates;

#[cfg(feature = "email-resend")]
mod resend;
#[cfg(feature = "email-smtp")]
mod smtp;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{EmailConfig, EmailProviderConfig};

/// Email sending error
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// A single outbound message.
#[derive(Clone, Debug)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Trait for email providers
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single message.
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError>;

    /// Send a batch of messages (broadcast notifications).
    async fn send_batch(&self, messages: &[OutboundEmail]) -> Result<(), EmailError>;
}

/// Create a mailer from configuration. `None` config means no provider is
/// set up: callers log the content instead of sending.
pub fn create_mailer(config: Option<&EmailConfig>) -> Result<Option<Box<dyn Mailer>>, EmailError> {
    let Some(config) = config else {
        return Ok(None);
    };
    let mailer: Box<dyn Mailer> = match &config.provider {
        #[cfg(feature = "email-resend")]
        EmailProviderConfig::Resend { api_key } => Box::new(resend::ResendMailer::new(
            api_key.clone(),
            config.from_address.clone(),
            config.from_name.clone(),
        )),
        #[cfg(not(feature = "email-resend"))]
        EmailProviderConfig::Resend { .. } => {
            return Err(EmailError::ProviderNotAvailable(
                "Resend support not compiled in. Enable the 'email-resend' feature.".to_string(),
            ))
        }
        #[cfg(feature = "email-smtp")]
        EmailProviderConfig::Smtp {
            host,
            port,
            username,
            password,
            use_tls,
        } => Box::new(smtp::SmtpMailer::new(
            host.clone(),
            *port,
            username.clone(),
            password.clone(),
            *use_tls,
            config.from_address.clone(),
            config.from_name.clone(),
        )?),
        #[cfg(not(feature = "email-smtp"))]
        EmailProviderConfig::Smtp { .. } => {
            return Err(EmailError::ProviderNotAvailable(
                "SMTP support not compiled in. Enable the 'email-smtp' feature.".to_string(),
            ))
        }
    };
    Ok(Some(mailer))
}
