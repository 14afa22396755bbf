//! Lifecycle event ingress from the record CRUD layer.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use autoflow_app::ports::{AutomationLogStore, AutomationRepository, DataStore, Transport};
use autoflow_app::runner::FiringReport;
use autoflow_domain::event::LifecycleEvent;
use autoflow_domain::id::{AutomationId, LogId};
use autoflow_domain::log::LogStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// One automation that fired for an ingested event.
#[derive(Debug, Serialize)]
pub struct FiringSummary {
    pub automation_id: AutomationId,
    pub log_id: LogId,
    pub status: LogStatus,
    pub summary: String,
}

impl From<&FiringReport> for FiringSummary {
    fn from(report: &FiringReport) -> Self {
        Self {
            automation_id: report.log.automation_id,
            log_id: report.log.id,
            status: report.log.status,
            summary: report.summary(),
        }
    }
}

/// `POST /api/events` — offer an event to every active automation.
pub async fn ingest<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Json(event): Json<LifecycleEvent>,
) -> Result<Json<Vec<FiringSummary>>, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let reports = state.runner.process_event(&event).await?;
    tracing::debug!(source = %event.source, fired = reports.len(), "event processed");
    Ok(Json(reports.iter().map(FiringSummary::from).collect()))
}
