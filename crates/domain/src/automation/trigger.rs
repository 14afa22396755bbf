//! Trigger — the event pattern that activates an automation.

use serde::{Deserialize, Serialize};

use crate::automation::condition::Operator;
use crate::event::{EventSource, LifecycleEvent};
use crate::id::TableRef;
use crate::record::{FieldValue, Record};

/// Describes what event pattern should activate an automation.
///
/// Time-driven variants (`schedule`, `date_approaching`) are computed by
/// an external scheduler, which raises a [`EventSource::Scheduler`] event
/// when they are due; this type only accepts the resulting firing. A manual
/// run is accepted as well, so such automations can be run on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires on a recurring schedule.
    Schedule {
        /// E.g. `"daily"`, `"weekly"`, `"hourly"`.
        frequency: String,
        /// Optional `HH:MM` time of day.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<String>,
    },
    /// Fires when a record is inserted into `table`.
    RecordCreated { table: TableRef },
    /// Fires when a record of `table` changes.
    RecordUpdated { table: TableRef },
    /// Fires when a record of `table` satisfies an embedded field check.
    FieldMatch {
        table: TableRef,
        field: String,
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<FieldValue>,
    },
    /// Fires ahead of a date stored in a record.
    DateApproaching {
        table: TableRef,
        date_field: String,
        /// Lead time, in days.
        lead_days: u32,
    },
    /// Fires only when triggered explicitly.
    Manual,
}

impl Trigger {
    /// Check whether this trigger accepts a lifecycle event.
    ///
    /// Pure: the same trigger/event pair always gives the same answer.
    #[must_use]
    pub fn matches(&self, event: &LifecycleEvent) -> bool {
        match self {
            Self::Manual => true,
            Self::RecordCreated { table } => event.concerns_table(table) && is_creation(event),
            Self::RecordUpdated { table } => event.concerns_table(table) && is_update(event),
            Self::FieldMatch {
                table,
                field,
                operator,
                value,
            } => {
                let Some(table_name) = event.table.as_ref() else {
                    return false;
                };
                table_name == table && field_matches(field, *operator, value.as_ref(), event)
            }
            Self::Schedule { .. } => is_time_driven(event),
            Self::DateApproaching { table, .. } => {
                is_time_driven(event) && event.concerns_table(table)
            }
        }
    }

    /// Whether broadcast events from `source` should be offered to this
    /// trigger at all.
    ///
    /// Manual triggers never listen: they only fire through an explicit
    /// run request.
    #[must_use]
    pub fn listens_to(&self, source: EventSource) -> bool {
        match self {
            Self::RecordCreated { .. } | Self::RecordUpdated { .. } | Self::FieldMatch { .. } => {
                source == EventSource::Record
            }
            Self::Schedule { .. } | Self::DateApproaching { .. } => {
                source == EventSource::Scheduler
            }
            Self::Manual => false,
        }
    }

    /// The table this trigger watches, if any.
    #[must_use]
    pub fn table(&self) -> Option<&TableRef> {
        match self {
            Self::RecordCreated { table }
            | Self::RecordUpdated { table }
            | Self::FieldMatch { table, .. }
            | Self::DateApproaching { table, .. } => Some(table),
            Self::Schedule { .. } | Self::Manual => None,
        }
    }
}

/// Raised by the scheduler, or an explicit manual run.
fn is_time_driven(event: &LifecycleEvent) -> bool {
    matches!(event.source, EventSource::Scheduler | EventSource::Manual)
}

/// A new record is present and no prior record is.
#[must_use]
pub fn is_creation(event: &LifecycleEvent) -> bool {
    event.old_record.is_none() && event.has_current_record()
}

/// Both the old and the new record are present.
#[must_use]
pub fn is_update(event: &LifecycleEvent) -> bool {
    event.old_record.is_some() && event.has_current_record()
}

/// The event's subject record satisfies the field check.
#[must_use]
pub fn field_matches(
    field: &str,
    operator: Operator,
    value: Option<&FieldValue>,
    event: &LifecycleEvent,
) -> bool {
    let empty = Record::new();
    let record = event.subject().unwrap_or(&empty);
    operator.apply(record.get(field), value)
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schedule {
                frequency,
                time: Some(time),
            } => write!(f, "schedule({frequency} at {time})"),
            Self::Schedule { frequency, .. } => write!(f, "schedule({frequency})"),
            Self::RecordCreated { table } => write!(f, "record_created({table})"),
            Self::RecordUpdated { table } => write!(f, "record_updated({table})"),
            Self::FieldMatch {
                table,
                field,
                operator,
                ..
            } => write!(f, "field_match({table}.{field} {operator})"),
            Self::DateApproaching {
                table,
                date_field,
                lead_days,
            } => write!(f, "date_approaching({table}.{date_field}, {lead_days}d)"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    fn lead_score_trigger() -> Trigger {
        Trigger::FieldMatch {
            table: "leads".into(),
            field: "score".to_string(),
            operator: Operator::GreaterThan,
            value: Some(FieldValue::from(80)),
        }
    }

    fn new_record_event(table: &str, value: serde_json::Value) -> LifecycleEvent {
        LifecycleEvent {
            source: EventSource::Record,
            table: Some(table.into()),
            new_record: Some(record(value)),
            ..LifecycleEvent::default()
        }
    }

    #[test]
    fn should_always_match_manual_trigger() {
        assert!(Trigger::Manual.matches(&LifecycleEvent::default()));
        assert!(Trigger::Manual.matches(&LifecycleEvent::created("tasks", Record::new())));
        assert!(Trigger::Manual.matches(&LifecycleEvent::scheduled(None, None)));
    }

    #[test]
    fn should_match_record_created_only_without_old_record() {
        let trigger = Trigger::RecordCreated {
            table: "tasks".into(),
        };
        assert!(trigger.matches(&LifecycleEvent::created("tasks", Record::new())));
        assert!(!trigger.matches(&LifecycleEvent::updated(
            "tasks",
            Record::new(),
            Record::new()
        )));
        assert!(!trigger.matches(&LifecycleEvent::default()));
    }

    #[test]
    fn should_match_record_updated_only_with_both_records() {
        let trigger = Trigger::RecordUpdated {
            table: "tasks".into(),
        };
        assert!(trigger.matches(&LifecycleEvent::updated(
            "tasks",
            Record::new(),
            Record::new()
        )));
        assert!(!trigger.matches(&LifecycleEvent::created("tasks", Record::new())));
    }

    #[test]
    fn should_not_match_record_triggers_for_other_tables() {
        let trigger = Trigger::RecordCreated {
            table: "tasks".into(),
        };
        assert!(!trigger.matches(&LifecycleEvent::created("leads", Record::new())));
    }

    #[test]
    fn should_match_field_match_when_record_satisfies_check() {
        let trigger = lead_score_trigger();
        assert!(trigger.matches(&new_record_event("leads", json!({"score": 95}))));
        assert!(!trigger.matches(&new_record_event("leads", json!({"score": 50}))));
    }

    #[test]
    fn should_not_match_field_match_for_other_or_missing_table() {
        let trigger = lead_score_trigger();
        assert!(!trigger.matches(&new_record_event("contacts", json!({"score": 95}))));

        let mut event = new_record_event("leads", json!({"score": 95}));
        event.table = None;
        assert!(!trigger.matches(&event));
    }

    #[test]
    fn should_accept_scheduler_firings_for_time_triggers() {
        let schedule = Trigger::Schedule {
            frequency: "daily".to_string(),
            time: Some("08:00".to_string()),
        };
        assert!(schedule.matches(&LifecycleEvent::scheduled(None, None)));
        assert!(!schedule.matches(&LifecycleEvent::created("tasks", Record::new())));

        let approaching = Trigger::DateApproaching {
            table: "tasks".into(),
            date_field: "due".to_string(),
            lead_days: 2,
        };
        assert!(approaching.matches(&LifecycleEvent::scheduled(Some("tasks".into()), None)));
        assert!(!approaching.matches(&LifecycleEvent::scheduled(Some("leads".into()), None)));
    }

    #[test]
    fn should_accept_manual_runs_for_time_triggers_but_not_broadcast_them() {
        let schedule = Trigger::Schedule {
            frequency: "daily".to_string(),
            time: None,
        };
        assert!(schedule.matches(&LifecycleEvent::manual(None, None)));
        assert!(!schedule.listens_to(EventSource::Manual));

        let approaching = Trigger::DateApproaching {
            table: "tasks".into(),
            date_field: "due".to_string(),
            lead_days: 1,
        };
        assert!(approaching.matches(&LifecycleEvent::manual(Some("tasks".into()), None)));
        assert!(!approaching.matches(&LifecycleEvent::manual(Some("leads".into()), None)));
        assert!(!approaching.listens_to(EventSource::Manual));
    }

    #[test]
    fn should_listen_only_to_matching_sources() {
        let created = Trigger::RecordCreated {
            table: "tasks".into(),
        };
        assert!(created.listens_to(EventSource::Record));
        assert!(!created.listens_to(EventSource::Scheduler));
        assert!(!Trigger::Manual.listens_to(EventSource::Manual));
        assert!(!Trigger::Manual.listens_to(EventSource::Record));
    }

    #[test]
    fn should_deserialize_field_match_from_tagged_json() {
        let trigger: Trigger = serde_json::from_value(json!({
            "type": "field_match",
            "table": "leads",
            "field": "score",
            "operator": "greater_than",
            "value": 80
        }))
        .unwrap();
        assert_eq!(trigger, lead_score_trigger());
    }

    #[test]
    fn should_display_trigger_variants() {
        assert_eq!(Trigger::Manual.to_string(), "manual");
        assert_eq!(
            lead_score_trigger().to_string(),
            "field_match(leads.score greater_than)"
        );
        assert_eq!(
            Trigger::Schedule {
                frequency: "daily".to_string(),
                time: None
            }
            .to_string(),
            "schedule(daily)"
        );
    }
}
