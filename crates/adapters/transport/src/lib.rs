//! # autoflow-adapter-transport
//!
//! Outbound side effects of automation actions: webhook calls over
//! [reqwest](https://docs.rs/reqwest) and e-mail over SMTP with
//! [lettre](https://docs.rs/lettre).
//!
//! ## Dependency rule
//! Depends on `autoflow-app` (for the [`Transport`] port) and
//! `autoflow-domain`. The `app` and `domain` crates must never reference
//! this adapter.

mod config;
mod email;
mod error;
mod http;

use autoflow_app::ports::{EmailMessage, HttpRequest, HttpResponse, Transport, TransportError};

pub use config::{HttpConfig, SmtpConfig};
pub use error::BuildError;

use email::Mailer;
use http::WebhookClient;

/// [`Transport`] backed by a shared HTTP client and an optional SMTP pool.
///
/// Without SMTP settings every `send_email` fails with
/// [`TransportError::NotConfigured`].
#[derive(Clone)]
pub struct NetworkTransport {
    http: WebhookClient,
    mailer: Option<Mailer>,
}

impl NetworkTransport {
    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the HTTP client cannot be created or the
    /// SMTP sender or relay is invalid.
    pub fn new(http: HttpConfig, smtp: Option<&SmtpConfig>) -> Result<Self, BuildError> {
        Ok(Self {
            http: WebhookClient::new(http)?,
            mailer: smtp.map(Mailer::new).transpose()?,
        })
    }

    /// Whether `send_email` can deliver anything.
    #[must_use]
    pub fn email_enabled(&self) -> bool {
        self.mailer.is_some()
    }
}

impl Transport for NetworkTransport {
    async fn http_call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.http.call(request).await
    }

    async fn send_email(&self, message: EmailMessage) -> Result<(), TransportError> {
        match &self.mailer {
            Some(mailer) => mailer.send(message).await,
            None => Err(TransportError::NotConfigured("e-mail")),
        }
    }
}
