//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AutoflowError`] via `#[from]`. Action failures are *not* errors at
//! this level: they are reported as structured results by the engine.

/// Top-level error for domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum AutoflowError {
    /// A domain invariant was violated (malformed automation shape, …).
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A persistence adapter failed.
    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Violations of the automation data-model invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("an automation needs at least one action")]
    NoActions,

    #[error("operator `{operator}` on field `{field}` requires a comparison value")]
    MissingComparisonValue { field: String, operator: String },

    #[error("action id `{0}` is used more than once")]
    DuplicateActionId(String),

    #[error("invalid identifier `{0}`")]
    InvalidId(String),
}

/// A missing item, identified by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_autoflow_error() {
        let err: AutoflowError = ValidationError::NoActions.into();
        assert!(matches!(
            err,
            AutoflowError::Validation(ValidationError::NoActions)
        ));
    }

    #[test]
    fn should_describe_missing_item() {
        let err = NotFoundError {
            entity: "Automation",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Automation `42` not found");
    }
}
