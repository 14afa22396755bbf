//! Shared application state for axum handlers.

use std::sync::Arc;

use autoflow_app::dispatcher::ActionDispatcher;
use autoflow_app::ports::{
    AutomationLogStore, AutomationRepository, DataStore, DeferredClient, Transport,
};
use autoflow_app::runner::{AutomationRunner, EngineConfig};
use autoflow_app::services::automation_service::AutomationService;

/// The automation service as wired behind the HTTP API.
pub type Service<AR, LS> = AutomationService<Arc<AR>, Arc<LS>>;

/// The runner as wired behind the HTTP API.
pub type Runner<AR, LS, D, T> = AutomationRunner<Arc<AR>, Arc<LS>, Arc<D>, Arc<T>, DeferredClient>;

/// Application state shared across all axum handlers.
///
/// Generic over the store and transport types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<AR, LS, D, T> {
    /// Automation CRUD and log queries.
    pub automation_service: Arc<Service<AR, LS>>,
    /// Engine entry points.
    pub runner: Arc<Runner<AR, LS, D, T>>,
}

impl<AR, LS, D, T> Clone for AppState<AR, LS, D, T> {
    fn clone(&self) -> Self {
        Self {
            automation_service: Arc::clone(&self.automation_service),
            runner: Arc::clone(&self.runner),
        }
    }
}

impl<AR, LS, D, T> AppState<AR, LS, D, T>
where
    AR: AutomationRepository + Send + Sync + 'static,
    LS: AutomationLogStore + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
    T: Transport + Send + Sync + 'static,
{
    /// Wire the service and the runner over one set of stores.
    pub fn new(automations: AR, logs: LS, data: D, transport: T, config: EngineConfig) -> Self {
        let automations = Arc::new(automations);
        let logs = Arc::new(logs);
        let dispatcher = ActionDispatcher::new(Arc::new(data), Arc::new(transport), DeferredClient);
        let runner = AutomationRunner::new(
            Arc::clone(&automations),
            Arc::clone(&logs),
            dispatcher,
            config,
        );
        Self {
            automation_service: Arc::new(AutomationService::new(automations, logs)),
            runner: Arc::new(runner),
        }
    }
}
