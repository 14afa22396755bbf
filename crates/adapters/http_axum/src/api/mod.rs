//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod pages;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post, put};

use autoflow_app::ports::{AutomationLogStore, AutomationRepository, DataStore, Transport};
use autoflow_domain::id::AutomationId;

use crate::error::ApiError;
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<AutomationId, ApiError> {
    AutomationId::from_str(raw).map_err(|_| ApiError::invalid_id(raw))
}

/// Build the `/api` sub-router.
pub fn routes<AR, LS, D, T>() -> Router<AppState<AR, LS, D, T>>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    Router::new()
        // Automations
        .route(
            "/automations",
            get(automations::list::<AR, LS, D, T>).post(automations::create::<AR, LS, D, T>),
        )
        .route(
            "/automations/{id}",
            get(automations::get::<AR, LS, D, T>)
                .put(automations::update::<AR, LS, D, T>)
                .delete(automations::delete::<AR, LS, D, T>),
        )
        .route(
            "/automations/{id}/status",
            put(automations::set_status::<AR, LS, D, T>),
        )
        .route(
            "/automations/{id}/logs",
            get(automations::logs::<AR, LS, D, T>),
        )
        .route(
            "/automations/{id}/run",
            post(automations::run::<AR, LS, D, T>),
        )
        // Engine ingress
        .route("/events", post(events::ingest::<AR, LS, D, T>))
        .route("/pages/run", post(pages::run::<AR, LS, D, T>))
}
