//! Outbound Mail Interface
//!
//! The backend only ever needs fire-and-forget HTML mail (verification
//! links, password resets). Delivery failures are surfaced to the caller
//! as warnings and never roll back the operation that triggered the mail.

use thiserror::Error;

/// Mail delivery error
#[derive(Debug, Error)]
pub enum MailError {
    /// The address is not deliverable
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Transport failure (connection, auth, upstream rejection)
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Outbound mail sender
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Send an HTML mail to a single recipient
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// Mailer that only logs the send
///
/// Used in development and tests; production wires a real transport behind
/// the same trait.
#[derive(Debug, Clone, Default)]
pub struct TracingMailer;

impl Mailer for TracingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        if !to.contains('@') {
            return Err(MailError::InvalidRecipient(to.to_string()));
        }

        tracing::info!(
            to = %to,
            subject = %subject,
            body_bytes = html_body.len(),
            "Outbound mail"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracing_mailer_accepts_valid_address() {
        let mailer = TracingMailer;
        let result =
            Mailer::send(&mailer, "user@example.com", "Welcome", "<p>hello</p>").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_tracing_mailer_rejects_garbage_address() {
        let mailer = TracingMailer;
        let result =
            Mailer::send(&mailer, "not-an-address", "Welcome", "<p>hello</p>").await;
        assert!(matches!(result, Err(MailError::InvalidRecipient(_))));
    }
}
