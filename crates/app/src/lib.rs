//! # autoflow-app
//!
//! Application layer — the rule engine, use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationRepository` — CRUD for automations
//!   - `AutomationLogStore` — append & query firing logs
//!   - `DataStore` — the record store actions read and write
//!   - `Transport` — outbound HTTP and e-mail
//!   - `ClientPort` — navigation, new tabs and clipboard in the user's client
//! - Run automations:
//!   - `AutomationRunner` — trigger → conditions → ordered actions → log
//!   - `ActionDispatcher` — one executor per action kind, failure-isolated
//!   - quick automation fan-out for page events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `AutomationService` — validated CRUD, pause/resume, recent logs
//!
//! ## Dependency rule
//! Depends on `autoflow-domain` only (plus `futures` and `tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod context;
pub mod dispatcher;
pub mod ports;
pub mod quick;
pub mod runner;
pub mod services;

#[cfg(test)]
mod test_support;
