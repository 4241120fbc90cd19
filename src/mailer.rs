use axum::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

// The relay is fixed; only the credentials come from the environment.
pub const SMTP_HOST: &str = "smtp.gmail.com";
pub const SMTP_PORT: u16 = 465;

#[derive(Debug, Error)]
pub enum MailError {
    /// A required mail setting was never configured.
    #[error("mail settings incomplete: {0} is not set")]
    Config(&'static str),

    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport failed: {0}")]
    Transport(String),
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        MailError::Transport(e.to_string())
    }
}

/// Outbound mail seam. Credentials travel with the call; nothing is cached
/// between sends.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        sender: &str,
        recipient: &str,
        app_password: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError>;
}

/// Sends through the fixed relay over implicit TLS. Each call builds its own
/// transport, so every send is exactly one connection, opened and dropped.
pub struct SmtpMailer;

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        sender: &str,
        recipient: &str,
        app_password: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        let message = Message::builder()
            .from(sender.parse()?)
            .to(recipient.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)?
            .port(SMTP_PORT)
            .credentials(Credentials::new(sender.to_string(), app_password.to_string()))
            .build();

        transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_missing_setting() {
        let err = MailError::Config("MAIL_SENDER");
        assert_eq!(
            err.to_string(),
            "mail settings incomplete: MAIL_SENDER is not set"
        );
    }

    #[test]
    fn address_errors_come_from_parsing() {
        let err: MailError = "not an address"
            .parse::<lettre::message::Mailbox>()
            .unwrap_err()
            .into();
        assert!(matches!(err, MailError::Address(_)));
    }
}
