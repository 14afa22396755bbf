//! Execution context — the state threaded through one firing.
//!
//! The context carries the record being acted on plus the set of action ids
//! currently executing. The in-flight set is the only shared mutable state;
//! a nested `run_automation` firing (or a page batch) shares it with its
//! parent so that an action cannot re-enter itself.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use autoflow_domain::event::LifecycleEvent;
use autoflow_domain::id::{ActionId, TableRef};
use autoflow_domain::record::Record;

/// Action ids currently executing, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct InFlightSet(Arc<Mutex<HashSet<ActionId>>>);

impl InFlightSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as executing.
    ///
    /// Returns `None` when `id` is already in flight. The returned guard
    /// removes the id when dropped, including during unwinding.
    #[must_use]
    pub fn try_acquire(&self, id: &ActionId) -> Option<InFlightGuard> {
        if !self.lock().insert(id.clone()) {
            return None;
        }
        Some(InFlightGuard {
            set: self.clone(),
            id: id.clone(),
        })
    }

    #[must_use]
    pub fn contains(&self, id: &ActionId) -> bool {
        self.lock().contains(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Never held across an `.await`.
    fn lock(&self) -> MutexGuard<'_, HashSet<ActionId>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped membership of one action id in an [`InFlightSet`].
#[derive(Debug)]
#[must_use = "the action leaves the in-flight set as soon as the guard is dropped"]
pub struct InFlightGuard {
    set: InFlightSet,
    id: ActionId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

/// Per-firing state handed to every action executor.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Table named by the triggering event. Record actions name their own.
    pub table: Option<TableRef>,
    /// The record actions operate on by default.
    pub record: Option<Record>,
    pub old_record: Option<Record>,
    pub new_record: Option<Record>,
    in_flight: InFlightSet,
    depth: u32,
}

impl ExecutionContext {
    /// Build the context of a top-level firing.
    #[must_use]
    pub fn from_event(event: &LifecycleEvent, in_flight: InFlightSet) -> Self {
        Self {
            table: event.table.clone(),
            record: event.subject().cloned(),
            old_record: event.old_record.clone(),
            new_record: event.new_record.clone(),
            in_flight,
            depth: 0,
        }
    }

    /// Context for a firing started by a `run_automation` action: same
    /// record, same in-flight set, one level deeper.
    #[must_use]
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn in_flight(&self) -> &InFlightSet {
        &self.in_flight
    }

    /// Number of `run_automation` hops above this context.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The context record, or an empty record when there is none.
    #[must_use]
    pub fn subject(&self) -> Cow<'_, Record> {
        self.record
            .as_ref()
            .map_or_else(|| Cow::Owned(Record::new()), Cow::Borrowed)
    }

    /// Replace the context record with `updated` when both have the same id,
    /// so later actions observe the change.
    pub fn refresh_record(&mut self, updated: &Record) {
        let same = match (&self.record, updated.id()) {
            (Some(current), Some(id)) => current.id().as_ref() == Some(&id),
            _ => false,
        };
        if same {
            self.record = Some(updated.clone());
        }
    }
}
