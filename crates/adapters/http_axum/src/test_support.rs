//! In-memory port implementations for router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use autoflow_app::ports::{
    AutomationLogStore, AutomationRepository, DataStore, EmailMessage, HttpRequest, HttpResponse,
    Transport, TransportError,
};
use autoflow_app::runner::EngineConfig;
use autoflow_domain::automation::Automation;
use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::{AutomationId, RecordId, TableRef};
use autoflow_domain::log::AutomationLog;
use autoflow_domain::record::{Fields, Record};

use crate::state::AppState;

#[derive(Default)]
pub struct MemoryAutomations(Mutex<HashMap<AutomationId, Automation>>);

impl AutomationRepository for MemoryAutomations {
    async fn create(&self, automation: Automation) -> Result<Automation, AutoflowError> {
        self.0
            .lock()
            .unwrap()
            .insert(automation.id, automation.clone());
        Ok(automation)
    }

    async fn get_by_id(&self, id: AutomationId) -> Result<Option<Automation>, AutoflowError> {
        Ok(self.0.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Automation>, AutoflowError> {
        Ok(self.0.lock().unwrap().values().cloned().collect())
    }

    async fn get_active(&self) -> Result<Vec<Automation>, AutoflowError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.is_active())
            .cloned()
            .collect())
    }

    async fn update(&self, automation: Automation) -> Result<Automation, AutoflowError> {
        self.create(automation).await
    }

    async fn delete(&self, id: AutomationId) -> Result<(), AutoflowError> {
        self.0.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLogs(Mutex<Vec<AutomationLog>>);

impl AutomationLogStore for MemoryLogs {
    async fn append(&self, log: AutomationLog) -> Result<AutomationLog, AutoflowError> {
        self.0.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn find_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> Result<Vec<AutomationLog>, AutoflowError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|log| log.automation_id == automation_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryRecords(Mutex<HashMap<(TableRef, RecordId), Record>>);

impl DataStore for MemoryRecords {
    async fn get(&self, table: &TableRef, id: &RecordId) -> Result<Option<Record>, AutoflowError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .get(&(table.clone(), id.clone()))
            .cloned())
    }

    async fn insert(&self, table: &TableRef, fields: Fields) -> Result<Record, AutoflowError> {
        let record = Record::from_fields(fields);
        let id = record.id().unwrap_or_else(|| RecordId::from("generated"));
        self.0
            .lock()
            .unwrap()
            .insert((table.clone(), id), record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        table: &TableRef,
        id: &RecordId,
        updates: Fields,
    ) -> Result<Option<Record>, AutoflowError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .get_mut(&(table.clone(), id.clone()))
            .map(|record| {
                record.merge(&updates);
                record.clone()
            }))
    }

    async fn delete(&self, table: &TableRef, id: &RecordId) -> Result<bool, AutoflowError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .remove(&(table.clone(), id.clone()))
            .is_some())
    }
}

/// Answers every call with 200 and refuses e-mail.
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    async fn http_call(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            body: serde_json::Value::Null,
        })
    }

    async fn send_email(&self, _message: EmailMessage) -> Result<(), TransportError> {
        Err(TransportError::NotConfigured("e-mail"))
    }
}

pub type TestState = AppState<MemoryAutomations, MemoryLogs, MemoryRecords, OfflineTransport>;

pub fn test_state() -> TestState {
    AppState::new(
        MemoryAutomations::default(),
        MemoryLogs::default(),
        MemoryRecords::default(),
        OfflineTransport,
        EngineConfig::default(),
    )
}
