//! Condition — a guard that must be true for the automation to proceed.
//!
//! Conditions are pure predicates over a [`Record`]: no IO, no clock, no
//! side effects, so evaluation order never changes the outcome.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{FieldValue, Record};

/// Comparison applied by a field condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

impl Operator {
    /// Whether the operator needs a comparison value.
    ///
    /// `is_empty` / `is_not_empty` ignore any supplied value.
    #[must_use]
    pub fn requires_value(self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
        }
    }

    /// Apply the operator to an actual field value (absent when the record
    /// lacks the field) and the expected comparison value.
    ///
    /// Numeric operators compare the numeric coercions of both sides; a
    /// non-numeric side makes the comparison false. A missing comparison
    /// value makes every value-requiring operator false.
    #[must_use]
    pub fn apply(self, actual: Option<&FieldValue>, expected: Option<&FieldValue>) -> bool {
        match self {
            Self::IsEmpty => actual.is_none_or(FieldValue::is_empty),
            Self::IsNotEmpty => !actual.is_none_or(FieldValue::is_empty),
            Self::Equals => expected.is_some_and(|expected| equals(actual, expected)),
            Self::NotEquals => expected.is_some_and(|expected| !equals(actual, expected)),
            Self::Contains => match (actual, expected) {
                (None | Some(FieldValue::Null), _) | (_, None) => false,
                (Some(actual), Some(expected)) => {
                    actual.as_text().contains(expected.as_text().as_str())
                }
            },
            Self::GreaterThan => numeric(actual, expected).is_some_and(|(a, b)| a > b),
            Self::LessThan => numeric(actual, expected).is_some_and(|(a, b)| a < b),
        }
    }
}

fn equals(actual: Option<&FieldValue>, expected: &FieldValue) -> bool {
    actual.unwrap_or(&FieldValue::Null).loosely_equals(expected)
}

fn numeric(actual: Option<&FieldValue>, expected: Option<&FieldValue>) -> Option<(f64, f64)> {
    Some((actual?.as_number()?, expected?.as_number()?))
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean combinator of a logic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOperator {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// A predicate over a record.
///
/// Conditions form a tree (groups own their children), so evaluation
/// always terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Compare one field of the record.
    Field {
        field: String,
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<FieldValue>,
    },
    /// Combine nested conditions with AND / OR.
    Logic {
        operator: LogicOperator,
        #[serde(default)]
        conditions: Vec<Condition>,
    },
}

impl Condition {
    /// Shorthand for a field condition.
    #[must_use]
    pub fn field(
        field: impl Into<String>,
        operator: Operator,
        value: Option<FieldValue>,
    ) -> Self {
        Self::Field {
            field: field.into(),
            operator,
            value,
        }
    }

    /// AND group.
    #[must_use]
    pub fn all(conditions: Vec<Self>) -> Self {
        Self::Logic {
            operator: LogicOperator::And,
            conditions,
        }
    }

    /// OR group.
    #[must_use]
    pub fn any(conditions: Vec<Self>) -> Self {
        Self::Logic {
            operator: LogicOperator::Or,
            conditions,
        }
    }

    /// Evaluate against a record.
    ///
    /// AND short-circuits on the first false child, OR on the first true
    /// one. An empty AND group is true, an empty OR group is false.
    #[must_use]
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            Self::Field {
                field,
                operator,
                value,
            } => operator.apply(record.get(field), value.as_ref()),
            Self::Logic {
                operator: LogicOperator::And,
                conditions,
            } => conditions.iter().all(|c| c.evaluate(record)),
            Self::Logic {
                operator: LogicOperator::Or,
                conditions,
            } => conditions.iter().any(|c| c.evaluate(record)),
        }
    }

    /// Check that every value-requiring operator in the tree has a value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingComparisonValue`] for the first
    /// offending field condition.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Field {
                field,
                operator,
                value,
            } => {
                if operator.requires_value() && value.is_none() {
                    return Err(ValidationError::MissingComparisonValue {
                        field: field.clone(),
                        operator: operator.as_str().to_string(),
                    });
                }
                Ok(())
            }
            Self::Logic { conditions, .. } => conditions.iter().try_for_each(Self::validate),
        }
    }
}

/// Evaluate a condition list as an implicit AND.
///
/// An empty list is vacuously true.
#[must_use]
pub fn evaluate_all(conditions: &[Condition], record: &Record) -> bool {
    conditions.iter().all(|c| c.evaluate(record))
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field {
                field,
                operator,
                value: Some(value),
            } if operator.requires_value() => write!(f, "{field} {operator} {value}"),
            Self::Field {
                field, operator, ..
            } => write!(f, "{field} {operator}"),
            Self::Logic {
                operator,
                conditions,
            } => {
                let name = match operator {
                    LogicOperator::And => "AND",
                    LogicOperator::Or => "OR",
                };
                let parts: Vec<String> = conditions.iter().map(ToString::to_string).collect();
                write!(f, "{name}({})", parts.join(", "))
            }
        }
    }
}
