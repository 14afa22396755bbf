//! Automation log port — append-only storage of firing logs.

use std::future::Future;
use std::sync::Arc;

use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::AutomationId;
use autoflow_domain::log::AutomationLog;

/// Append-only store for [`AutomationLog`]s. Entries are never mutated.
pub trait AutomationLogStore {
    /// Persist a new log entry.
    fn append(
        &self,
        log: AutomationLog,
    ) -> impl Future<Output = Result<AutomationLog, AutoflowError>> + Send;

    /// Logs of one automation, newest first.
    fn find_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AutomationLog>, AutoflowError>> + Send;
}

impl<T: AutomationLogStore + Send + Sync> AutomationLogStore for Arc<T> {
    fn append(
        &self,
        log: AutomationLog,
    ) -> impl Future<Output = Result<AutomationLog, AutoflowError>> + Send {
        (**self).append(log)
    }

    fn find_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AutomationLog>, AutoflowError>> + Send {
        (**self).find_by_automation(automation_id, limit)
    }
}
