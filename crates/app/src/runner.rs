//! Automation runner — takes one automation through a firing.
//!
//! `Idle → TriggerChecked → ConditionsChecked → ActionsExecuting → Completed`.
//! A trigger or condition mismatch ends in [`Firing::Rejected`] and writes
//! nothing. Otherwise every action runs, in declared order, and exactly one
//! [`AutomationLog`] is appended to the log store.

use autoflow_domain::automation::{Action, Automation, evaluate_all};
use autoflow_domain::error::{AutoflowError, NotFoundError};
use autoflow_domain::event::{EventSource, LifecycleEvent};
use autoflow_domain::id::AutomationId;
use autoflow_domain::log::AutomationLog;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::json;
use tokio::time::Instant;

use crate::context::{ExecutionContext, InFlightSet};
use crate::dispatcher::{ActionDispatcher, ActionError, ActionResult, NestedRunner, first_failure};
use crate::ports::{AutomationLogStore, AutomationRepository, ClientPort, DataStore, Transport};

/// Summary shown for a firing in which every action succeeded.
pub const SUCCESS_SUMMARY: &str = "Automation completed successfully";

/// Tunables of the engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// How many `run_automation` hops a firing may make.
    pub max_call_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_call_depth: 8 }
    }
}

/// Why a firing stopped before executing any action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    TriggerMismatch,
    ConditionsNotMet,
    /// Paused automations only run on manual request.
    Paused,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::TriggerMismatch => "Trigger did not match",
            Self::ConditionsNotMet => "Conditions not met",
            Self::Paused => "Automation is paused",
        })
    }
}

/// Everything a completed firing produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiringReport {
    pub log: AutomationLog,
    pub results: Vec<ActionResult>,
}

impl FiringReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.log.is_success()
    }

    /// Human-readable outcome: the success message, or the first failing
    /// action's error.
    #[must_use]
    pub fn summary(&self) -> String {
        first_failure(&self.results).map_or_else(|| SUCCESS_SUMMARY.to_string(), str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Firing {
    Rejected(RejectReason),
    Completed(FiringReport),
}

impl Firing {
    #[must_use]
    pub fn report(&self) -> Option<&FiringReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn into_report(self) -> Option<FiringReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Rejected(_) => None,
        }
    }
}

/// Runs automations against the ports.
pub struct AutomationRunner<AR, LS, D, T, C> {
    automations: AR,
    logs: LS,
    dispatcher: ActionDispatcher<D, T, C>,
    config: EngineConfig,
}

impl<AR, LS, D, T, C> AutomationRunner<AR, LS, D, T, C>
where
    AR: AutomationRepository + Send + Sync,
    LS: AutomationLogStore + Send + Sync,
    D: DataStore + Send + Sync,
    T: Transport + Send + Sync,
    C: ClientPort + Send + Sync,
{
    /// Create a new runner.
    pub fn new(
        automations: AR,
        logs: LS,
        dispatcher: ActionDispatcher<D, T, C>,
        config: EngineConfig,
    ) -> Self {
        Self {
            automations,
            logs,
            dispatcher,
            config,
        }
    }

    /// Fire `automation` for `event`.
    ///
    /// Rejections and failing actions are regular outcomes, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::Validation`] when the automation itself is
    /// malformed.
    #[tracing::instrument(skip_all, fields(automation_id = %automation.id, source = %event.source))]
    pub async fn run(
        &self,
        automation: &Automation,
        event: &LifecycleEvent,
    ) -> Result<Firing, AutoflowError> {
        automation.validate()?;

        if !automation.is_active() && event.source != EventSource::Manual {
            return Ok(Firing::Rejected(RejectReason::Paused));
        }
        if !automation.trigger.matches(event) {
            tracing::debug!(trigger = %automation.trigger, "trigger did not match");
            return Ok(Firing::Rejected(RejectReason::TriggerMismatch));
        }

        let mut ctx = ExecutionContext::from_event(event, InFlightSet::new());
        if !evaluate_all(&automation.conditions, &ctx.subject()) {
            tracing::debug!("conditions not met");
            return Ok(Firing::Rejected(RejectReason::ConditionsNotMet));
        }

        let started = Instant::now();
        let results = self.execute_actions(&automation.actions, &mut ctx).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let input = json!(event);
        let output = json!({ "results": results, "record": ctx.record });
        let log = match first_failure(&results) {
            None => AutomationLog::success(automation.id, duration_ms, input, output),
            Some(error) => AutomationLog::failure(automation.id, duration_ms, input, output, error),
        };
        tracing::info!(status = %log.status, duration_ms, "automation fired");

        if let Err(err) = self.logs.append(log.clone()).await {
            tracing::warn!(error = %err, "failed to store automation log");
        }

        Ok(Firing::Completed(FiringReport { log, results }))
    }

    /// Load an automation from the store and fire it.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::NotFound`] when no automation has `id`,
    /// plus the errors of [`run`](Self::run) and of the repository.
    pub async fn run_by_id(
        &self,
        id: AutomationId,
        event: &LifecycleEvent,
    ) -> Result<Firing, AutoflowError> {
        let automation = self.automations.get_by_id(id).await?.ok_or_else(|| {
            AutoflowError::from(NotFoundError {
                entity: "Automation",
                id: id.to_string(),
            })
        })?;
        self.run(&automation, event).await
    }

    /// Offer a broadcast event to every active automation listening to its
    /// source, one after the other.
    ///
    /// Each selected automation gets its own execution context. Malformed
    /// automations are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading automations fails.
    #[tracing::instrument(skip_all, fields(source = %event.source))]
    pub async fn process_event(
        &self,
        event: &LifecycleEvent,
    ) -> Result<Vec<FiringReport>, AutoflowError> {
        let automations = self.automations.get_active().await?;
        let mut reports = Vec::new();

        for automation in automations
            .iter()
            .filter(|automation| automation.trigger.listens_to(event.source))
        {
            match self.run(automation, event).await {
                Ok(Firing::Completed(report)) => reports.push(report),
                Ok(Firing::Rejected(reason)) => {
                    tracing::debug!(automation_id = %automation.id, %reason, "automation rejected");
                }
                Err(err) => {
                    tracing::warn!(automation_id = %automation.id, error = %err, "skipping malformed automation");
                }
            }
        }

        Ok(reports)
    }

    /// Run `actions` strictly in order; a failure never stops the rest.
    pub(crate) async fn execute_actions(
        &self,
        actions: &[Action],
        ctx: &mut ExecutionContext,
    ) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.dispatcher.execute(action, ctx, self).await);
        }
        results
    }
}

impl<AR, LS, D, T, C> NestedRunner for AutomationRunner<AR, LS, D, T, C>
where
    AR: AutomationRepository + Send + Sync,
    LS: AutomationLogStore + Send + Sync,
    D: DataStore + Send + Sync,
    T: Transport + Send + Sync,
    C: ClientPort + Send + Sync,
{
    fn run_nested<'a>(
        &'a self,
        automation_id: AutomationId,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, Result<serde_json::Value, ActionError>> {
        Box::pin(async move {
            if ctx.depth() >= self.config.max_call_depth {
                return Err(ActionError::DepthExceeded(self.config.max_call_depth));
            }
            let target = self
                .automations
                .get_by_id(automation_id)
                .await?
                .ok_or(ActionError::AutomationNotFound(automation_id))?;

            let mut nested = ctx.nested();
            if !evaluate_all(&target.conditions, &nested.subject()) {
                return Err(ActionError::ConditionsNotMet(automation_id));
            }

            tracing::debug!(%automation_id, depth = nested.depth(), "running nested automation");
            let results = self.execute_actions(&target.actions, &mut nested).await;
            ctx.record = nested.record;

            if let Some(error) = first_failure(&results) {
                return Err(ActionError::Nested(error.to_string()));
            }
            Ok(json!({ "automation_id": automation_id, "results": results }))
        })
    }
}
