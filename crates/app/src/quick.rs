//! Quick automation layer — fan-out of page-scoped rules.
//!
//! Unlike the top-level runner, a page event is offered to every quick
//! automation of the page at once and the matching ones run concurrently.
//! The whole batch shares one in-flight set. Nothing is logged: page
//! automations are not in the automation store.

use autoflow_domain::automation::evaluate_all;
use autoflow_domain::error::AutoflowError;
use autoflow_domain::event::LifecycleEvent;
use autoflow_domain::id::QuickAutomationId;
use autoflow_domain::quick::QuickAutomation;
use futures::future::join_all;
use serde::Serialize;
use tracing::Instrument;

use crate::context::{ExecutionContext, InFlightSet};
use crate::dispatcher::ActionResult;
use crate::ports::{AutomationLogStore, AutomationRepository, ClientPort, DataStore, Transport};
use crate::runner::AutomationRunner;

/// Result of one quick automation that passed its trigger and conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickOutcome {
    pub automation_id: QuickAutomationId,
    pub name: String,
    pub success: bool,
    pub results: Vec<ActionResult>,
}

/// Collected outcomes of a page batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageRunReport {
    pub outcomes: Vec<QuickOutcome>,
}

impl PageRunReport {
    /// Number of quick automations that fired.
    #[must_use]
    pub fn fired(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.success)
    }
}

impl<AR, LS, D, T, C> AutomationRunner<AR, LS, D, T, C>
where
    AR: AutomationRepository + Send + Sync,
    LS: AutomationLogStore + Send + Sync,
    D: DataStore + Send + Sync,
    T: Transport + Send + Sync,
    C: ClientPort + Send + Sync,
{
    /// Fire every quick automation of a page that matches `event`.
    ///
    /// Manual quick automations are only offered manual events and record
    /// ones only record events. Malformed quick automations are skipped with
    /// a warning.
    #[tracing::instrument(skip_all, fields(source = %event.source, candidates = automations.len()))]
    pub async fn run_page_automations(
        &self,
        automations: &[QuickAutomation],
        event: &LifecycleEvent,
    ) -> PageRunReport {
        let in_flight = InFlightSet::new();
        let firings = automations
            .iter()
            .filter(|automation| automation.trigger.listens_to(event.source))
            .map(|automation| {
                let span = tracing::info_span!("quick_automation", id = %automation.id, name = %automation.name);
                let in_flight = in_flight.clone();
                async move {
                    match self.fire_quick(automation, event, in_flight).await {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            tracing::warn!(error = %err, "skipping malformed quick automation");
                            None
                        }
                    }
                }
                .instrument(span)
            });

        let outcomes: Vec<QuickOutcome> = join_all(firings).await.into_iter().flatten().collect();
        tracing::info!(fired = outcomes.len(), "page automations done");
        PageRunReport { outcomes }
    }

    /// Fire a single quick automation, e.g. from a page button.
    ///
    /// Returns `None` when its trigger or conditions reject the event.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::Validation`] when the quick automation is
    /// malformed.
    #[tracing::instrument(skip_all, fields(id = %automation.id))]
    pub async fn run_quick_automation(
        &self,
        automation: &QuickAutomation,
        event: &LifecycleEvent,
    ) -> Result<Option<QuickOutcome>, AutoflowError> {
        self.fire_quick(automation, event, InFlightSet::new()).await
    }

    async fn fire_quick(
        &self,
        automation: &QuickAutomation,
        event: &LifecycleEvent,
        in_flight: InFlightSet,
    ) -> Result<Option<QuickOutcome>, AutoflowError> {
        automation.validate()?;
        if !automation.trigger.matches(event) {
            return Ok(None);
        }
        let mut ctx = ExecutionContext::from_event(event, in_flight);
        if !evaluate_all(&automation.conditions, &ctx.subject()) {
            return Ok(None);
        }

        let results = self.execute_actions(&automation.actions, &mut ctx).await;
        Ok(Some(QuickOutcome {
            automation_id: automation.id,
            name: automation.name.clone(),
            success: results.iter().all(ActionResult::is_success),
            results,
        }))
    }
}
