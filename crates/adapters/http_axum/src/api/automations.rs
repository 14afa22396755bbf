//! JSON REST handlers for automations.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use autoflow_app::dispatcher::ActionResult;
use autoflow_app::ports::{AutomationLogStore, AutomationRepository, DataStore, Transport};
use autoflow_app::runner::Firing;
use autoflow_domain::automation::{
    Action, Automation, AutomationBuilder, AutomationStatus, Condition, Trigger,
};
use autoflow_domain::event::LifecycleEvent;
use autoflow_domain::id::TableRef;
use autoflow_domain::log::AutomationLog;
use autoflow_domain::record::Record;

use super::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LOG_LIMIT: usize = 50;
const MAX_LOG_LIMIT: usize = 500;

/// Request body for creating or replacing an automation.
#[derive(Deserialize)]
pub struct AutomationRequest {
    pub name: String,
    #[serde(default)]
    pub status: AutomationStatus,
    /// Defaults to a manual trigger.
    pub trigger: Option<Trigger>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl AutomationRequest {
    fn into_builder(self) -> AutomationBuilder {
        let mut builder = Automation::builder().name(self.name).status(self.status);
        if let Some(trigger) = self.trigger {
            builder = builder.trigger(trigger);
        }
        for c in self.conditions {
            builder = builder.condition(c);
        }
        for a in self.actions {
            builder = builder.action(a);
        }
        builder
    }
}

/// Request body for pausing or resuming an automation.
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: AutomationStatus,
}

/// Request body for a manual run.
#[derive(Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub table: Option<TableRef>,
    #[serde(default)]
    pub record: Option<Record>,
}

#[derive(Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

/// Outcome label of a run-now request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
    Rejected,
}

/// What the caller of run-now gets back.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub status: RunStatus,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<AutomationLog>,
    pub results: Vec<ActionResult>,
}

impl From<Firing> for RunResponse {
    fn from(firing: Firing) -> Self {
        match firing {
            Firing::Rejected(reason) => Self {
                status: RunStatus::Rejected,
                summary: reason.to_string(),
                log: None,
                results: Vec::new(),
            },
            Firing::Completed(report) => Self {
                status: if report.is_success() {
                    RunStatus::Success
                } else {
                    RunStatus::Error
                },
                summary: report.summary(),
                log: Some(report.log),
                results: report.results,
            },
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Automation>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Automation>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Automation>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/automations` — list all automations.
pub async fn list<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
) -> Result<ListResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automations = state.automation_service.list_automations().await?;
    Ok(ListResponse::Ok(Json(automations)))
}

/// `GET /api/automations/{id}` — get automation by ID.
pub async fn get<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let automation = state
        .automation_service
        .get_automation(automation_id)
        .await?;
    Ok(GetResponse::Ok(Json(automation)))
}

/// `POST /api/automations` — create a new automation.
pub async fn create<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Json(req): Json<AutomationRequest>,
) -> Result<CreateResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automation = req.into_builder().build()?;
    let created = state
        .automation_service
        .create_automation(automation)
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/automations/{id}` — replace an existing automation.
pub async fn update<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Path(id): Path<String>,
    Json(req): Json<AutomationRequest>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let automation = req.into_builder().id(automation_id).build()?;
    let updated = state
        .automation_service
        .update_automation(automation)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `PUT /api/automations/{id}/status` — pause or resume.
pub async fn set_status<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let automation = state
        .automation_service
        .set_status(automation_id, req.status)
        .await?;
    Ok(GetResponse::Ok(Json(automation)))
}

/// `DELETE /api/automations/{id}` — delete an automation. Logs are kept.
pub async fn delete<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    state
        .automation_service
        .delete_automation(automation_id)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/automations/{id}/logs?limit=` — recent logs, newest first.
pub async fn logs<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<AutomationLog>>, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LOG_LIMIT)
        .min(MAX_LOG_LIMIT);
    let logs = state
        .automation_service
        .recent_logs(automation_id, limit)
        .await?;
    Ok(Json(logs))
}

/// `POST /api/automations/{id}/run` — run now, as a manual event.
pub async fn run<AR, LS, D, T>(
    State(state): State<AppState<AR, LS, D, T>>,
    Path(id): Path<String>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let event = LifecycleEvent::manual(req.table, req.record);
    let firing = state.runner.run_by_id(automation_id, &event).await?;
    Ok(Json(RunResponse::from(firing)))
}
