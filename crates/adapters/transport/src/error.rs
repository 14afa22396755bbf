//! Errors raised while building the transport.

/// The transport could not be constructed from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot build HTTP client")]
    Http(#[from] reqwest::Error),

    #[error("invalid sender address `{address}`")]
    Sender {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("cannot reach SMTP relay")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
