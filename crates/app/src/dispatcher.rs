//! Action dispatcher — one executor per action kind.
//!
//! Executors return `Result<serde_json::Value, ActionError>`; [`ActionDispatcher::execute`]
//! folds that (and any panic) into an [`ActionResult`], so a single action
//! can never abort its siblings.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use autoflow_domain::automation::{Action, ActionKind, HttpMethod};
use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::{ActionId, AutomationId, PageId, RecordId, TableRef};
use autoflow_domain::record::{FieldValue, Fields};
use autoflow_domain::template;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::ExecutionContext;
use crate::ports::{
    ClientError, ClientPort, DataStore, EmailMessage, HttpRequest, Transport, TransportError,
};

/// Result message of an action whose own condition did not hold.
pub const CONDITION_NOT_MET: &str = "Action condition not met";

/// Outcome of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Failed,
    /// The action's condition was false. Counts as a failure when
    /// aggregating a firing.
    Skipped,
}

/// Structured per-action result, as stored in the firing log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_id: ActionId,
    pub action_type: String,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    fn success(action: &Action, data: serde_json::Value) -> Self {
        Self {
            action_id: action.id.clone(),
            action_type: action.kind.type_name().to_string(),
            status: ActionStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    fn failed(action: &Action, error: &ActionError) -> Self {
        Self {
            action_id: action.id.clone(),
            action_type: action.kind.type_name().to_string(),
            status: ActionStatus::Failed,
            data: None,
            error: Some(error.to_string()),
        }
    }

    fn skipped(action: &Action) -> Self {
        Self {
            action_id: action.id.clone(),
            action_type: action.kind.type_name().to_string(),
            status: ActionStatus::Skipped,
            data: None,
            error: Some(CONDITION_NOT_MET.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

/// The first error among `results`, if any action did not succeed.
#[must_use]
pub fn first_failure(results: &[ActionResult]) -> Option<&str> {
    results
        .iter()
        .find(|result| !result.is_success())
        .map(|result| result.error.as_deref().unwrap_or("Action failed"))
}

/// Why a single action failed.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Record has no field `{0}`")]
    NoSuchField(String),

    #[error("Record not found")]
    RecordNotFound,

    #[error("Automation {0} not found")]
    AutomationNotFound(AutomationId),

    #[error("Conditions of automation {0} not met")]
    ConditionsNotMet(AutomationId),

    #[error("Loop prevention: action {0} is already executing")]
    LoopPrevention(ActionId),

    #[error("Maximum automation call depth ({0}) exceeded")]
    DepthExceeded(u32),

    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    /// First failure of a nested `run_automation` firing.
    #[error("{0}")]
    Nested(String),

    #[error("Action panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] AutoflowError),
}

/// Runs another automation on behalf of a `run_automation` action.
///
/// Implemented by the runner; kept object-safe so the dispatcher can call
/// back into it without knowing its type parameters.
pub trait NestedRunner: Send + Sync {
    fn run_nested<'a>(
        &'a self,
        automation_id: AutomationId,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, Result<serde_json::Value, ActionError>>;
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ActionError> {
    value.ok_or(ActionError::MissingField(field))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Executes actions against the data, transport and client ports.
pub struct ActionDispatcher<D, T, C> {
    data: D,
    transport: T,
    client: C,
}

impl<D, T, C> ActionDispatcher<D, T, C>
where
    D: DataStore + Send + Sync,
    T: Transport + Send + Sync,
    C: ClientPort + Send + Sync,
{
    pub fn new(data: D, transport: T, client: C) -> Self {
        Self {
            data,
            transport,
            client,
        }
    }

    /// Gate, guard and execute one action.
    ///
    /// Never fails: a false action condition yields a skipped result, a
    /// re-entrant action a loop-prevention failure, and a panicking
    /// executor a failure carrying the panic message.
    #[tracing::instrument(skip_all, fields(action = %action))]
    pub async fn execute(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        nested: &dyn NestedRunner,
    ) -> ActionResult {
        if let Some(condition) = &action.condition
            && !condition.evaluate(&ctx.subject())
        {
            tracing::debug!("action condition not met");
            return ActionResult::skipped(action);
        }

        let Some(_guard) = ctx.in_flight().try_acquire(&action.id) else {
            let err = ActionError::LoopPrevention(action.id.clone());
            tracing::warn!(error = %err, "re-entrant action rejected");
            return ActionResult::failed(action, &err);
        };

        let outcome = AssertUnwindSafe(self.dispatch(action, ctx, nested))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(data)) => ActionResult::success(action, data),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "action failed");
                ActionResult::failed(action, &err)
            }
            Err(payload) => {
                let err = ActionError::Panicked(panic_message(payload.as_ref()));
                tracing::error!(error = %err, "action panicked");
                ActionResult::failed(action, &err)
            }
        }
    }

    async fn dispatch(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        nested: &dyn NestedRunner,
    ) -> Result<serde_json::Value, ActionError> {
        match &action.kind {
            ActionKind::UpdateRecord {
                table,
                updates,
                record_id,
            } => {
                let updates = require(updates.clone(), "updates")?;
                self.update_record(table.as_ref(), updates, record_id.as_ref(), ctx)
                    .await
            }
            ActionKind::CreateRecord { table, updates } => {
                self.create_record(table.as_ref(), updates.as_ref()).await
            }
            ActionKind::DeleteRecord { table, record_id } => {
                self.delete_record(table.as_ref(), record_id.as_ref(), ctx)
                    .await
            }
            ActionKind::DuplicateRecord { table, record_id } => {
                self.duplicate_record(table.as_ref(), record_id.as_ref(), ctx)
                    .await
            }
            ActionKind::NavigateToPage { page_id } => self.navigate(page_id.as_ref()).await,
            ActionKind::OpenRecord { table, record_id } => {
                self.open_record(table.as_ref(), record_id.as_ref(), ctx)
                    .await
            }
            ActionKind::SendEmail { to, subject, body } => {
                self.send_email(to.as_deref(), subject.as_deref(), body.as_deref(), ctx)
                    .await
            }
            ActionKind::Webhook { url, method, body } => {
                self.webhook(url.as_deref(), *method, body.as_ref(), ctx)
                    .await
            }
            ActionKind::RunAutomation { automation_id } => {
                let automation_id = require(*automation_id, "automation_id")?;
                nested.run_nested(automation_id, ctx).await
            }
            ActionKind::OpenUrl { url } => self.open_url(url.as_deref(), ctx).await,
            ActionKind::SetFieldValue {
                table,
                field_key,
                field_value,
                record_id,
            } => {
                let field_key = require(field_key.clone(), "field_key")?;
                let field_value = require(field_value.clone(), "field_value")?;
                let updates = Fields::from([(field_key, field_value)]);
                self.update_record(table.as_ref(), updates, record_id.as_ref(), ctx)
                    .await
            }
            ActionKind::CopyToClipboard { field_key } => {
                self.copy_to_clipboard(field_key.as_deref(), ctx).await
            }
        }
    }

    async fn update_record(
        &self,
        table: Option<&TableRef>,
        updates: Fields,
        record_id: Option<&RecordId>,
        ctx: &mut ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let table = require(table, "table")?.clone();
        let id = resolve_record_id(record_id, ctx)?;
        let updated = self
            .data
            .update(&table, &id, updates)
            .await?
            .ok_or(ActionError::RecordNotFound)?;
        ctx.refresh_record(&updated);
        Ok(json!({ "record": updated.to_json() }))
    }

    async fn create_record(
        &self,
        table: Option<&TableRef>,
        updates: Option<&Fields>,
    ) -> Result<serde_json::Value, ActionError> {
        let table = require(table, "table")?.clone();
        let fields = require(updates, "updates")?.clone();
        let created = self.data.insert(&table, fields).await?;
        Ok(json!({ "record": created.to_json() }))
    }

    async fn delete_record(
        &self,
        table: Option<&TableRef>,
        record_id: Option<&RecordId>,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let table = require(table, "table")?.clone();
        let id = resolve_record_id(record_id, ctx)?;
        if !self.data.delete(&table, &id).await? {
            return Err(ActionError::RecordNotFound);
        }
        Ok(json!({ "deleted": id }))
    }

    async fn duplicate_record(
        &self,
        table: Option<&TableRef>,
        record_id: Option<&RecordId>,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let table = require(table, "table")?.clone();
        let id = resolve_record_id(record_id, ctx)?;
        let source = self
            .data
            .get(&table, &id)
            .await?
            .ok_or(ActionError::RecordNotFound)?;
        let copy = self.data.insert(&table, source.without_identity()).await?;
        Ok(json!({ "record": copy.to_json() }))
    }

    async fn navigate(&self, page_id: Option<&PageId>) -> Result<serde_json::Value, ActionError> {
        let page_id = require(page_id, "page_id")?;
        self.client.navigate(page_id).await?;
        Ok(json!({ "navigate": page_id }))
    }

    async fn open_record(
        &self,
        table: Option<&TableRef>,
        record_id: Option<&RecordId>,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let table = require(table, "table")?.clone();
        let id = resolve_record_id(record_id, ctx)?;
        self.client.open_record(&table, &id).await?;
        Ok(json!({ "open_record": { "table": table, "record_id": id } }))
    }

    async fn send_email(
        &self,
        to: Option<&str>,
        subject: Option<&str>,
        body: Option<&str>,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let message = {
            let record = ctx.subject();
            EmailMessage {
                to: template::render(require(to, "to")?, &record),
                subject: template::render(require(subject, "subject")?, &record),
                body: template::render(require(body, "body")?, &record),
            }
        };
        let sent_to = message.to.clone();
        self.transport.send_email(message).await?;
        Ok(json!({ "sent_to": sent_to }))
    }

    async fn webhook(
        &self,
        url: Option<&str>,
        method: Option<HttpMethod>,
        body: Option<&serde_json::Value>,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let url = require(url, "url")?.to_string();
        let body = match body {
            Some(body) => template::render_json(body, &ctx.subject()),
            None => json!({ "record": ctx.record.as_ref().map(|record| record.to_json()) }),
        };
        let request = HttpRequest {
            method: method.unwrap_or_default(),
            url,
            body: Some(body),
        };
        let response = self.transport.http_call(request).await?;
        if !response.is_success() {
            return Err(ActionError::HttpStatus(response.status));
        }
        Ok(json!({ "status": response.status, "body": response.body }))
    }

    async fn open_url(
        &self,
        url: Option<&str>,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let url = template::render(require(url, "url")?, &ctx.subject());
        self.client.open_url(&url).await?;
        Ok(json!({ "open_url": url }))
    }

    async fn copy_to_clipboard(
        &self,
        field_key: Option<&str>,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ActionError> {
        let field_key = require(field_key, "field_key")?;
        let text = ctx
            .subject()
            .get(field_key)
            .map(FieldValue::as_text)
            .ok_or_else(|| ActionError::NoSuchField(field_key.to_string()))?;
        self.client.copy_to_clipboard(&text).await?;
        Ok(json!({ "clipboard": text }))
    }
}

/// The action's record id, falling back to the context record's id.
fn resolve_record_id(
    record_id: Option<&RecordId>,
    ctx: &ExecutionContext,
) -> Result<RecordId, ActionError> {
    record_id
        .cloned()
        .or_else(|| ctx.record.as_ref().and_then(|record| record.id()))
        .ok_or(ActionError::MissingField("record_id"))
}
