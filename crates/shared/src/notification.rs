//! Notification collaborator contract and its SMTP implementation.
//!
//! The ledger only emits notification requests; delivery (and delivery
//! retries) are the collaborator's concern. Uses `lettre` for SMTP
//! transport.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use uuid::Uuid;

use crate::config::EmailConfig;

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to build the message.
    #[error("Failed to build notification: {0}")]
    Build(String),
    /// Failed to hand the message to the transport.
    #[error("Failed to send notification: {0}")]
    Send(String),
    /// Invalid recipient address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// A request to notify a recipient about a ledger event.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    /// Template identifier, e.g. `payment_credited`.
    pub template: String,
    /// Recipient email address.
    pub recipient_email: String,
    /// Free-form template payload.
    pub payload: serde_json::Value,
    /// Debts this notification relates to.
    pub related_debt_ids: Vec<Uuid>,
}

/// Fire-and-forget notification collaborator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Requests delivery of a notification.
    async fn send_notification(&self, request: NotificationRequest)
        -> Result<(), NotificationError>;
}

/// SMTP-backed notifier.
#[derive(Clone)]
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    /// Creates a new SMTP notifier.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotificationError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| NotificationError::Send(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build(),
        )
    }

    /// Renders the plain-text body for a template.
    ///
    /// Real template rendering lives in the presentation layer; this
    /// fallback keeps notifications readable when it is absent.
    fn render_body(request: &NotificationRequest) -> String {
        format!(
            "Notification: {}\n\n{}\n",
            request.template,
            serde_json::to_string_pretty(&request.payload).unwrap_or_default()
        )
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_notification(
        &self,
        request: NotificationRequest,
    ) -> Result<(), NotificationError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|_| NotificationError::InvalidAddress(from.clone()))?,
            )
            .to(request
                .recipient_email
                .parse()
                .map_err(|_| NotificationError::InvalidAddress(request.recipient_email.clone()))?)
            .subject(format!("Velka: {}", request.template))
            .header(ContentType::TEXT_PLAIN)
            .body(Self::render_body(&request))
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Send(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_body_includes_template_and_payload() {
        let request = NotificationRequest {
            template: "payment_credited".to_string(),
            recipient_email: "member@example.org".to_string(),
            payload: serde_json::json!({ "reason": "settled in cash" }),
            related_debt_ids: vec![],
        };

        let body = SmtpNotifier::render_body(&request);
        assert!(body.contains("payment_credited"));
        assert!(body.contains("settled in cash"));
    }
}
