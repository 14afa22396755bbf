//! E-mail delivery over SMTP with `lettre`.

use std::time::Duration;

use autoflow_app::ports::{EmailMessage, TransportError};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::BuildError;

#[derive(Clone)]
pub(crate) struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub(crate) fn new(config: &SmtpConfig) -> Result<Self, BuildError> {
        let address = config.sender();
        let from = address
            .parse::<Mailbox>()
            .map_err(|source| BuildError::Sender { address, source })?;

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder
            .port(config.port)
            .pool_config(PoolConfig::new().max_size(4))
            .timeout(Some(Duration::from_secs(10)));
        if let Some(username) = &config.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                config.password.clone().unwrap_or_default(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn compose(&self, message: &EmailMessage) -> Result<Message, TransportError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|err| TransportError::Email(format!("invalid recipient `{}`: {err}", message.to)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| TransportError::Email(err.to_string()))
    }

    pub(crate) async fn send(&self, message: EmailMessage) -> Result<(), TransportError> {
        let email = self.compose(&message)?;
        match self.transport.send(email).await {
            Ok(_) => {
                tracing::info!(to = %message.to, "e-mail sent");
                Ok(())
            }
            Err(err) => {
                tracing::error!(to = %message.to, error = %err, "e-mail delivery failed");
                Err(TransportError::Email(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            username: None,
            password: None,
            starttls: false,
            from_email: "robot@example.com".to_string(),
            from_name: Some("Autoflow".to_string()),
        }
    }

    #[test]
    fn should_reject_invalid_sender_address() {
        let mut bad = config();
        bad.from_email = "not an address".to_string();
        assert!(matches!(Mailer::new(&bad), Err(BuildError::Sender { .. })));
    }

    #[tokio::test]
    async fn should_compose_plain_text_message() {
        let mailer = Mailer::new(&config()).unwrap();
        let message = mailer
            .compose(&EmailMessage {
                to: "ada@example.com".to_string(),
                subject: "Task done".to_string(),
                body: "All good".to_string(),
            })
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains("Subject: Task done"));
        assert!(raw.contains("From: Autoflow <robot@example.com>"));
    }

    #[tokio::test]
    async fn should_fail_send_when_recipient_is_invalid() {
        let mailer = Mailer::new(&config()).unwrap();
        let err = mailer
            .send(EmailMessage {
                to: "nobody".to_string(),
                subject: String::new(),
                body: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Email(_)));
    }
}
