//! # autoflow-domain
//!
//! Pure domain model for the autoflow rule engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Records** (typed field maps handed to us by the record store)
//! - Define **Lifecycle events** (manual runs, scheduler firings, record changes)
//! - Define **Automations** (trigger → condition → action rules)
//! - Define **Quick automations** (page-scoped rules)
//! - Define **Automation logs** (one immutable entry per firing)
//! - Contain all invariant enforcement and pure evaluation logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod event;
pub mod log;
pub mod quick;
pub mod record;
pub mod template;
