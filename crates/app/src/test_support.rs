//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use autoflow_domain::automation::Automation;
use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::{AutomationId, PageId, RecordId, TableRef};
use autoflow_domain::log::AutomationLog;
use autoflow_domain::record::{Fields, Record};

use crate::dispatcher::ActionDispatcher;
use crate::ports::{
    AutomationLogStore, AutomationRepository, ClientError, ClientPort, DataStore, EmailMessage,
    HttpRequest, HttpResponse, Transport, TransportError,
};
use crate::runner::{AutomationRunner, EngineConfig};

// ── Automation repo ────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryAutomationRepo {
    store: Mutex<HashMap<AutomationId, Automation>>,
}

impl InMemoryAutomationRepo {
    pub fn with(automations: Vec<Automation>) -> Self {
        let map: HashMap<_, _> = automations.into_iter().map(|a| (a.id, a)).collect();
        Self {
            store: Mutex::new(map),
        }
    }
}

impl AutomationRepository for InMemoryAutomationRepo {
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, AutoflowError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(automation.id, automation.clone());
        async { Ok(automation) }
    }

    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, AutoflowError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, AutoflowError>> + Send {
        let result: Vec<Automation> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn get_active(&self) -> impl Future<Output = Result<Vec<Automation>, AutoflowError>> + Send {
        let result: Vec<Automation> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.is_active())
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, AutoflowError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(automation.id, automation.clone());
        async { Ok(automation) }
    }

    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), AutoflowError>> + Send {
        self.store.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

// ── Log store ──────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryLogStore {
    pub logs: Mutex<Vec<AutomationLog>>,
    pub fail: bool,
}

impl InMemoryLogStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.logs.lock().unwrap().len()
    }
}

impl AutomationLogStore for InMemoryLogStore {
    fn append(
        &self,
        log: AutomationLog,
    ) -> impl Future<Output = Result<AutomationLog, AutoflowError>> + Send {
        let result = if self.fail {
            Err(AutoflowError::Storage("log store offline".into()))
        } else {
            self.logs.lock().unwrap().push(log.clone());
            Ok(log)
        };
        async { result }
    }

    fn find_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AutomationLog>, AutoflowError>> + Send {
        let result: Vec<AutomationLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|log| log.automation_id == automation_id)
            .take(limit)
            .cloned()
            .collect();
        async { Ok(result) }
    }
}

// ── Data store ─────────────────────────────────────────────────

/// Records keyed by table then id. Every call is recorded in `calls`.
#[derive(Default)]
pub struct InMemoryData {
    tables: Mutex<HashMap<TableRef, HashMap<RecordId, Record>>>,
    next_id: Mutex<u32>,
    pub calls: Mutex<Vec<String>>,
}

impl InMemoryData {
    pub fn with(table: &str, records: Vec<Record>) -> Self {
        let data = Self::default();
        {
            let mut tables = data.tables.lock().unwrap();
            let rows = tables.entry(TableRef::from(table)).or_default();
            for record in records {
                let id = record.id().expect("seed records carry an id");
                rows.insert(id, record);
            }
        }
        data
    }

    pub fn record(&self, table: &str, id: &str) -> Option<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(&TableRef::from(table))
            .and_then(|rows| rows.get(&RecordId::from(id)))
            .cloned()
    }

    pub fn count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(&TableRef::from(table))
            .map_or(0, HashMap::len)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DataStore for InMemoryData {
    fn get(
        &self,
        table: &TableRef,
        id: &RecordId,
    ) -> impl Future<Output = Result<Option<Record>, AutoflowError>> + Send {
        self.log(format!("get {table}/{id}"));
        let result = self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.get(id))
            .cloned();
        async { Ok(result) }
    }

    fn insert(
        &self,
        table: &TableRef,
        mut fields: Fields,
    ) -> impl Future<Output = Result<Record, AutoflowError>> + Send {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("new-{next}")
        };
        self.log(format!("insert {table}/{id}"));
        fields.insert("id".to_string(), id.as_str().into());
        let record = Record::from_fields(fields);
        self.tables
            .lock()
            .unwrap()
            .entry(table.clone())
            .or_default()
            .insert(RecordId::from(id), record.clone());
        async { Ok(record) }
    }

    fn update(
        &self,
        table: &TableRef,
        id: &RecordId,
        updates: Fields,
    ) -> impl Future<Output = Result<Option<Record>, AutoflowError>> + Send {
        self.log(format!(
            "update {table}/{id} {}",
            serde_json::to_string(&updates).unwrap()
        ));
        let result = self
            .tables
            .lock()
            .unwrap()
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id))
            .map(|record| {
                record.merge(&updates);
                record.clone()
            });
        async { Ok(result) }
    }

    fn delete(
        &self,
        table: &TableRef,
        id: &RecordId,
    ) -> impl Future<Output = Result<bool, AutoflowError>> + Send {
        self.log(format!("delete {table}/{id}"));
        let removed = self
            .tables
            .lock()
            .unwrap()
            .get_mut(table)
            .is_some_and(|rows| rows.remove(id).is_some());
        async move { Ok(removed) }
    }
}

// ── Transport ──────────────────────────────────────────────────

/// Records requests and e-mails; answers every HTTP call with `status`.
pub struct RecordingTransport {
    pub status: u16,
    pub requests: Mutex<Vec<HttpRequest>>,
    pub emails: Mutex<Vec<EmailMessage>>,
    pub email_configured: bool,
    pub panics: bool,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self {
            status: 200,
            requests: Mutex::new(Vec::new()),
            emails: Mutex::new(Vec::new()),
            email_configured: true,
            panics: false,
        }
    }
}

impl RecordingTransport {
    pub fn answering(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn emails(&self) -> Vec<EmailMessage> {
        self.emails.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn http_call(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        assert!(!self.panics, "transport exploded");
        self.requests.lock().unwrap().push(request);
        let response = HttpResponse {
            status: self.status,
            body: serde_json::json!({"ok": true}),
        };
        async { Ok(response) }
    }

    fn send_email(
        &self,
        message: EmailMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        let result = if self.email_configured {
            self.emails.lock().unwrap().push(message);
            Ok(())
        } else {
            Err(TransportError::NotConfigured("e-mail"))
        };
        async { result }
    }
}

// ── Client ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingClient {
    pub effects: Mutex<Vec<String>>,
    pub clipboard_unavailable: bool,
}

impl RecordingClient {
    pub fn effects(&self) -> Vec<String> {
        self.effects.lock().unwrap().clone()
    }

    fn push(&self, effect: String) {
        self.effects.lock().unwrap().push(effect);
    }
}

impl ClientPort for RecordingClient {
    fn navigate(&self, page_id: &PageId) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.push(format!("navigate {page_id}"));
        async { Ok(()) }
    }

    fn open_record(
        &self,
        table: &TableRef,
        record_id: &RecordId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.push(format!("open_record {table}/{record_id}"));
        async { Ok(()) }
    }

    fn open_url(&self, url: &str) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.push(format!("open_url {url}"));
        async { Ok(()) }
    }

    fn copy_to_clipboard(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        let result = if self.clipboard_unavailable {
            Err(ClientError::Unavailable("clipboard"))
        } else {
            self.push(format!("clipboard {text}"));
            Ok(())
        };
        async { result }
    }
}

// ── Runner wiring ──────────────────────────────────────────────

pub type TestRunner = AutomationRunner<
    Arc<InMemoryAutomationRepo>,
    Arc<InMemoryLogStore>,
    Arc<InMemoryData>,
    Arc<RecordingTransport>,
    Arc<RecordingClient>,
>;

/// Handles on every fake behind a [`TestRunner`].
pub struct Harness {
    pub runner: TestRunner,
    pub repo: Arc<InMemoryAutomationRepo>,
    pub logs: Arc<InMemoryLogStore>,
    pub data: Arc<InMemoryData>,
    pub transport: Arc<RecordingTransport>,
    pub client: Arc<RecordingClient>,
}

impl Harness {
    pub fn new(repo: InMemoryAutomationRepo, data: InMemoryData) -> Self {
        Self::build(
            repo,
            InMemoryLogStore::default(),
            data,
            RecordingTransport::default(),
            RecordingClient::default(),
            EngineConfig::default(),
        )
    }

    pub fn build(
        repo: InMemoryAutomationRepo,
        logs: InMemoryLogStore,
        data: InMemoryData,
        transport: RecordingTransport,
        client: RecordingClient,
        config: EngineConfig,
    ) -> Self {
        let repo = Arc::new(repo);
        let logs = Arc::new(logs);
        let data = Arc::new(data);
        let transport = Arc::new(transport);
        let client = Arc::new(client);
        let dispatcher =
            ActionDispatcher::new(Arc::clone(&data), Arc::clone(&transport), Arc::clone(&client));
        let runner =
            AutomationRunner::new(Arc::clone(&repo), Arc::clone(&logs), dispatcher, config);
        Self {
            runner,
            repo,
            logs,
            data,
            transport,
            client,
        }
    }
}
