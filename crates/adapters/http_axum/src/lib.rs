//! # autoflow-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API over automations (`/api/automations`, …) and their
//!   execution logs
//! - Accept lifecycle events from the record CRUD layer (`POST /api/events`)
//!   and fan them out to the runner
//! - Run page quick automations on behalf of the browser
//!   (`POST /api/pages/run`)
//! - Map application results into HTTP responses
//!
//! Client-side effects (navigation, opening URLs, clipboard) cannot happen
//! on the server. The runner is wired with a
//! [`DeferredClient`](autoflow_app::ports::DeferredClient) and every
//! effect comes back to the caller in the action results.
//!
//! ## Dependency rule
//! Depends on `autoflow-app` (for port traits and services) and
//! `autoflow-domain` (for request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
