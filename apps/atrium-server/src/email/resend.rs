//! Resend email provider implementation.

use async_trait::async_trait;
use resend_rs::{types::CreateEmailBaseOptions, Resend};

use super::{EmailError, Mailer, OutboundEmail};

/// Resend email provider.
pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    /// Create a new Resend provider with the given API key and sender.
    pub fn new(api_key: String, from_address: String, from_name: Option<String>) -> Self {
        let from = match from_name {
            Some(name) => format!("{} <{}>", name, from_address),
            None => from_address,
        };
        Self {
            client: Resend::new(&api_key),
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let email = CreateEmailBaseOptions::new(self.from.clone(), vec![to.to_string()], subject)
            .with_html(html);

        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }

    async fn send_batch(&self, messages: &[OutboundEmail]) -> Result<(), EmailError> {
        let batch: Vec<_> = messages
            .iter()
            .map(|m| {
                CreateEmailBaseOptions::new(self.from.clone(), vec![m.to.clone()], &m.subject)
                    .with_html(&m.html)
            })
            .collect();

        self.client
            .batch
            .send(batch)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}
