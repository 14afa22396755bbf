//! Page quick automation batches.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use autoflow_app::ports::{AutomationLogStore, AutomationRepository, DataStore, Transport};
use autoflow_app::quick::PageRunReport;
use autoflow_domain::event::LifecycleEvent;
use autoflow_domain::quick::QuickAutomation;

use crate::state::AppState;

/// The quick automations of one page and the event that happened on it.
#[derive(Deserialize)]
pub struct PageRunRequest {
    pub automations: Vec<QuickAutomation>,
    #[serde(default)]
    pub event: LifecycleEvent,
}

/// `POST /api/pages/run` — fire every matching quick automation.
pub async fn run<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Json(req): Json<PageRunRequest>,
) -> Json<PageRunReport>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let report = state
        .runner
        .run_page_automations(&req.automations, &req.event)
        .await;
    Json(report)
}
