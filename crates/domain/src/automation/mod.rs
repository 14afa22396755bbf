//! Automation — trigger → condition → action rules.
//!
//! Each automation has a [`Trigger`] that determines when it is eligible
//! to fire, an ordered list of [`Condition`]s that must all hold (an empty
//! list always holds), and one or more [`Action`]s executed in order.

mod action;
mod condition;
mod trigger;

pub use action::{Action, ActionKind, HttpMethod};
pub use condition::{Condition, LogicOperator, Operator, evaluate_all};
pub use trigger::{Trigger, field_matches, is_creation, is_update};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AutoflowError, ValidationError};
use crate::id::AutomationId;

/// Whether the runner may select an automation for broadcast events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationStatus {
    #[default]
    Active,
    /// Never selected for scheduled or record events, but can still be
    /// run manually.
    Paused,
}

/// A rule that reacts to events by executing actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    pub id: AutomationId,
    pub name: String,
    #[serde(default)]
    pub status: AutomationStatus,
    pub trigger: Trigger,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl Automation {
    /// Create a builder for constructing an [`Automation`].
    #[must_use]
    pub fn builder() -> AutomationBuilder {
        AutomationBuilder::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AutomationStatus::Active
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::Validation`] when the name is empty, there
    /// are no actions, a condition lacks a required comparison value, or
    /// two actions share an id.
    pub fn validate(&self) -> Result<(), AutoflowError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        validate_rule(&self.conditions, &self.actions)?;
        if let Trigger::FieldMatch {
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

/// Invariants shared by automations and quick automations.
///
/// # Errors
///
/// Returns [`AutoflowError::Validation`] for an empty action list, a
/// condition missing its comparison value or a duplicated action id.
pub fn validate_rule(conditions: &[Condition], actions: &[Action]) -> Result<(), AutoflowError> {
    if actions.is_empty() {
        return Err(ValidationError::NoActions.into());
    }
    for condition in conditions {
        condition.validate()?;
    }
    let mut seen = HashSet::new();
    for action in actions {
        if let Some(condition) = &action.condition {
            condition.validate()?;
        }
        if !seen.insert(&action.id) {
            return Err(ValidationError::DuplicateActionId(action.id.to_string()).into());
        }
    }
    Ok(())
}

/// Step-by-step builder for [`Automation`].
#[derive(Debug, Default)]
pub struct AutomationBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    status: Option<AutomationStatus>,
    trigger: Option<Trigger>,
    conditions: Vec<Condition>,
    actions: Vec<Action>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: AutomationStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return an [`Automation`].
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<Automation, AutoflowError> {
        let automation = Automation {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            trigger: self.trigger.unwrap_or(Trigger::Manual),
            conditions: self.conditions,
            actions: self.actions,
        };
        automation.validate()?;
        Ok(automation)
    }
}
