//! Automation repository port — persistence for automation definitions.

use std::future::Future;
use std::sync::Arc;

use autoflow_domain::automation::Automation;
use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::AutomationId;

/// Repository for persisting and querying [`Automation`]s.
pub trait AutomationRepository {
    /// Create a new automation in storage.
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, AutoflowError>> + Send;

    /// Get an automation by its unique identifier.
    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, AutoflowError>> + Send;

    /// Get all automations.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, AutoflowError>> + Send;

    /// Get all automations whose status is `active`.
    fn get_active(&self) -> impl Future<Output = Result<Vec<Automation>, AutoflowError>> + Send;

    /// Update an existing automation.
    fn update(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, AutoflowError>> + Send;

    /// Delete an automation by its unique identifier.
    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), AutoflowError>> + Send;
}

impl<T: AutomationRepository + Send + Sync> AutomationRepository for Arc<T> {
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, AutoflowError>> + Send {
        (**self).create(automation)
    }

    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, AutoflowError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, AutoflowError>> + Send {
        (**self).get_all()
    }

    fn get_active(&self) -> impl Future<Output = Result<Vec<Automation>, AutoflowError>> + Send {
        (**self).get_active()
    }

    fn update(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, AutoflowError>> + Send {
        (**self).update(automation)
    }

    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), AutoflowError>> + Send {
        (**self).delete(id)
    }
}
