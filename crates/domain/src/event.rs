//! Lifecycle events — what the engine reacts to.
//!
//! Record create/update events come from the record store, manual events
//! from a user clicking "run", scheduler events from the (external)
//! scheduler when a time-driven trigger is due.

use serde::{Deserialize, Serialize};

use crate::id::TableRef;
use crate::record::Record;

/// Who raised a [`LifecycleEvent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Explicit user intent ("run now", a page button).
    #[default]
    Manual,
    /// Synthetic firing raised by the scheduler for a due time trigger.
    Scheduler,
    /// A record was created or updated in the record store.
    Record,
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Scheduler => "scheduler",
            Self::Record => "record",
        })
    }
}

/// An event entering the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    #[serde(default)]
    pub source: EventSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_record: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_record: Option<Record>,
}

impl LifecycleEvent {
    /// A manual invocation, optionally about a record.
    #[must_use]
    pub fn manual(table: Option<TableRef>, record: Option<Record>) -> Self {
        Self {
            source: EventSource::Manual,
            table,
            record,
            ..Self::default()
        }
    }

    /// A synthetic scheduler firing.
    #[must_use]
    pub fn scheduled(table: Option<TableRef>, record: Option<Record>) -> Self {
        Self {
            source: EventSource::Scheduler,
            table,
            record,
            ..Self::default()
        }
    }

    /// A record was inserted into `table`.
    #[must_use]
    pub fn created(table: impl Into<TableRef>, record: Record) -> Self {
        Self {
            source: EventSource::Record,
            table: Some(table.into()),
            record: Some(record.clone()),
            old_record: None,
            new_record: Some(record),
        }
    }

    /// A record of `table` changed from `old` to `new`.
    #[must_use]
    pub fn updated(table: impl Into<TableRef>, old: Record, new: Record) -> Self {
        Self {
            source: EventSource::Record,
            table: Some(table.into()),
            record: Some(new.clone()),
            old_record: Some(old),
            new_record: Some(new),
        }
    }

    /// The record the event is about: `record`, else `new_record`, else
    /// `old_record`.
    #[must_use]
    pub fn subject(&self) -> Option<&Record> {
        self.record
            .as_ref()
            .or(self.new_record.as_ref())
            .or(self.old_record.as_ref())
    }

    /// `true` when the event carries a current record (`record` or `new_record`).
    #[must_use]
    pub fn has_current_record(&self) -> bool {
        self.record.is_some() || self.new_record.is_some()
    }

    /// `true` when the event names `table`, or names no table at all.
    #[must_use]
    pub fn concerns_table(&self, table: &TableRef) -> bool {
        self.table.as_ref().is_none_or(|own| own == table)
    }
}
