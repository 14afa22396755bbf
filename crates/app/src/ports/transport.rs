//! Transport port — outbound HTTP calls and e-mail delivery.
//!
//! Timeouts are the adapter's concern; the engine awaits each call to
//! completion.

use std::future::Future;
use std::sync::Arc;

use autoflow_domain::automation::HttpMethod;

/// An outbound HTTP call made by a webhook action.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// What came back from an [`HttpRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// JSON body when parseable, otherwise the raw text as a JSON string.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Errors reported by a [`Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("e-mail delivery failed: {0}")]
    Email(String),

    #[error("{0} transport not configured")]
    NotConfigured(&'static str),
}

pub trait Transport {
    /// Perform an HTTP call. Non-2xx statuses are a successful call; only
    /// network-level failures are errors.
    fn http_call(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// Hand a message to the mail transport.
    fn send_email(
        &self,
        message: EmailMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl<T: Transport + Send + Sync> Transport for Arc<T> {
    fn http_call(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).http_call(request)
    }

    fn send_email(
        &self,
        message: EmailMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).send_email(message)
    }
}
