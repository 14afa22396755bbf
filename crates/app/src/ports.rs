//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod automation_repo;
pub mod client;
pub mod data_store;
pub mod log_store;
pub mod transport;

pub use automation_repo::AutomationRepository;
pub use client::{ClientError, ClientPort, DeferredClient};
pub use data_store::DataStore;
pub use log_store::AutomationLogStore;
pub use transport::{EmailMessage, HttpRequest, HttpResponse, Transport, TransportError};
