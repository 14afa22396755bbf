//! Quick automations — lightweight page-scoped rules.
//!
//! A quick automation is owned by a page rather than the global automation
//! list. It has no status and a narrower set of triggers, but otherwise
//! shares the condition and action model of [`Automation`](crate::automation::Automation).

use serde::{Deserialize, Serialize};

use crate::automation::{
    Action, Condition, Operator, field_matches, is_creation, is_update, validate_rule,
};
use crate::error::{AutoflowError, ValidationError};
use crate::event::{EventSource, LifecycleEvent};
use crate::id::{QuickAutomationId, TableRef};
use crate::record::FieldValue;

/// Triggers available to page-scoped automations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuickTrigger {
    RecordCreated,
    RecordUpdated,
    /// Like [`Trigger::FieldMatch`](crate::automation::Trigger::FieldMatch):
    /// the event must name `table`.
    FieldMatch {
        table: TableRef,
        field: String,
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<FieldValue>,
    },
    /// A page button.
    Manual,
}

impl QuickTrigger {
    #[must_use]
    pub fn matches(&self, event: &LifecycleEvent) -> bool {
        match self {
            Self::RecordCreated => is_creation(event),
            Self::RecordUpdated => is_update(event),
            Self::FieldMatch {
                table,
                field,
                operator,
                value,
            } => {
                event.table.as_ref() == Some(table)
                    && field_matches(field, *operator, value.as_ref(), event)
            }
            Self::Manual => true,
        }
    }

    /// Manual quick automations answer page clicks only; the others answer
    /// record events only.
    #[must_use]
    pub fn listens_to(&self, source: EventSource) -> bool {
        match self {
            Self::Manual => source == EventSource::Manual,
            Self::RecordCreated | Self::RecordUpdated | Self::FieldMatch { .. } => {
                source == EventSource::Record
            }
        }
    }
}

/// A page-scoped automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAutomation {
    #[serde(default)]
    pub id: QuickAutomationId,
    pub name: String,
    pub trigger: QuickTrigger,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl QuickAutomation {
    #[must_use]
    pub fn new(name: impl Into<String>, trigger: QuickTrigger, actions: Vec<Action>) -> Self {
        Self {
            id: QuickAutomationId::new(),
            name: name.into(),
            trigger,
            conditions: Vec::new(),
            actions,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// # Errors
    ///
    /// Same rules as [`Automation::validate`](crate::automation::Automation::validate).
    pub fn validate(&self) -> Result<(), AutoflowError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        validate_rule(&self.conditions, &self.actions)?;
        if let QuickTrigger::FieldMatch {
            field,
            operator,
            value,
            ..
        } = &self.trigger
        {
            Condition::field(field.clone(), *operator, value.clone()).validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::ActionKind;
    use crate::record::Record;
    use serde_json::json;

    fn copy_action() -> Action {
        Action::new(
            "q1",
            ActionKind::CopyToClipboard {
                field_key: Some("email".to_string()),
            },
        )
    }

    #[test]
    fn should_listen_to_manual_only_for_manual_trigger() {
        assert!(QuickTrigger::Manual.listens_to(EventSource::Manual));
        assert!(!QuickTrigger::Manual.listens_to(EventSource::Record));
        assert!(QuickTrigger::RecordCreated.listens_to(EventSource::Record));
        assert!(!QuickTrigger::RecordCreated.listens_to(EventSource::Manual));
        assert!(!QuickTrigger::RecordUpdated.listens_to(EventSource::Scheduler));
    }

    #[test]
    fn should_match_record_shapes() {
        let created = LifecycleEvent::created("tasks", Record::new());
        let updated = LifecycleEvent::updated("tasks", Record::new(), Record::new());
        assert!(QuickTrigger::RecordCreated.matches(&created));
        assert!(!QuickTrigger::RecordCreated.matches(&updated));
        assert!(QuickTrigger::RecordUpdated.matches(&updated));
        assert!(!QuickTrigger::RecordUpdated.matches(&created));
    }

    #[test]
    fn should_match_field_check_against_subject() {
        let trigger = QuickTrigger::FieldMatch {
            table: "tasks".into(),
            field: "priority".to_string(),
            operator: Operator::Equals,
            value: Some("high".into()),
        };
        let high = Record::from_json(json!({"priority": "high"})).unwrap();
        let low = Record::from_json(json!({"priority": "low"})).unwrap();
        assert!(trigger.matches(&LifecycleEvent::created("tasks", high)));
        assert!(!trigger.matches(&LifecycleEvent::created("tasks", low)));
    }

    #[test]
    fn should_not_match_field_check_for_other_or_missing_table() {
        let trigger = QuickTrigger::FieldMatch {
            table: "tasks".into(),
            field: "priority".to_string(),
            operator: Operator::Equals,
            value: Some("high".into()),
        };
        let high = Record::from_json(json!({"priority": "high"})).unwrap();
        assert!(!trigger.matches(&LifecycleEvent::created("leads", high.clone())));

        let mut untabled = LifecycleEvent::created("tasks", high);
        untabled.table = None;
        assert!(!trigger.matches(&untabled));
    }

    #[test]
    fn should_deserialize_field_match_with_table() {
        let trigger: QuickTrigger = serde_json::from_value(json!({
            "type": "field_match",
            "table": "leads",
            "field": "score",
            "operator": "greater_than",
            "value": 80
        }))
        .unwrap();
        assert!(matches!(trigger, QuickTrigger::FieldMatch { ref table, .. } if table.as_str() == "leads"));
    }

    #[test]
    fn should_validate_like_automation() {
        assert!(
            QuickAutomation::new("Copy", QuickTrigger::Manual, vec![copy_action()])
                .validate()
                .is_ok()
        );
        assert!(
            QuickAutomation::new("", QuickTrigger::Manual, vec![copy_action()])
                .validate()
                .is_err()
        );
        assert!(
            QuickAutomation::new("Empty", QuickTrigger::Manual, vec![])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn should_deserialize_without_id() {
        let quick: QuickAutomation = serde_json::from_value(json!({
            "name": "Copy email",
            "trigger": {"type": "manual"},
            "actions": [{"id": "q1", "type": "copy_to_clipboard", "field_key": "email"}]
        }))
        .unwrap();
        assert_eq!(quick.trigger, QuickTrigger::Manual);
        assert_eq!(quick.actions.len(), 1);
    }
}
