//! Action — the effect performed when an automation fires.

use serde::{Deserialize, Deserializer, Serialize};

use crate::automation::condition::Condition;
use crate::id::{ActionId, AutomationId, PageId, RecordId, TableRef};
use crate::record::{FieldValue, Fields};

/// One unit of side effect executed as part of a firing.
///
/// The `id` is stable and used only for re-entrancy tracking; it never
/// addresses records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    /// Optional per-action gate, evaluated against the context record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    #[must_use]
    pub fn new(id: impl Into<ActionId>, kind: ActionKind) -> Self {
        Self {
            id: id.into(),
            condition: None,
            kind,
        }
    }

    /// Attach a gating condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// HTTP verb used by webhook actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[default]
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of action kinds.
///
/// Every field is optional here; which ones are required depends on the
/// kind and is checked when the action executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Patch one record by id (explicit, or the context record's).
    UpdateRecord {
        table: Option<TableRef>,
        updates: Option<Fields>,
        record_id: Option<RecordId>,
    },
    /// Insert one record.
    CreateRecord {
        table: Option<TableRef>,
        updates: Option<Fields>,
    },
    /// Delete one record by id.
    DeleteRecord {
        table: Option<TableRef>,
        record_id: Option<RecordId>,
    },
    /// Copy a record without its identity and timestamp fields.
    DuplicateRecord {
        table: Option<TableRef>,
        record_id: Option<RecordId>,
    },
    /// Client-side navigation to a page.
    NavigateToPage { page_id: Option<PageId> },
    /// Client-side navigation to a record view.
    OpenRecord {
        table: Option<TableRef>,
        record_id: Option<RecordId>,
    },
    /// Send an e-mail. `{field}` placeholders are filled from the record.
    SendEmail {
        to: Option<String>,
        subject: Option<String>,
        body: Option<String>,
    },
    /// Call an arbitrary URL. The body defaults to `{"record": …}`.
    Webhook {
        url: Option<String>,
        method: Option<HttpMethod>,
        body: Option<serde_json::Value>,
    },
    /// Run another automation against the same record.
    RunAutomation { automation_id: Option<AutomationId> },
    /// Open a URL template in a new client context.
    OpenUrl { url: Option<String> },
    /// Set a single field on a record.
    SetFieldValue {
        table: Option<TableRef>,
        field_key: Option<String>,
        #[serde(default, deserialize_with = "present")]
        field_value: Option<FieldValue>,
        record_id: Option<RecordId>,
    },
    /// Copy one field of the context record to the clipboard.
    CopyToClipboard { field_key: Option<String> },
}

/// Keeps an explicit JSON `null` as `Some(FieldValue::Null)` so that a
/// field can be cleared; only an absent key means "not provided".
fn present<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FieldValue::deserialize(deserializer).map(Some)
}

impl ActionKind {
    /// The `type` tag of this kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::UpdateRecord { .. } => "update_record",
            Self::CreateRecord { .. } => "create_record",
            Self::DeleteRecord { .. } => "delete_record",
            Self::DuplicateRecord { .. } => "duplicate_record",
            Self::NavigateToPage { .. } => "navigate_to_page",
            Self::OpenRecord { .. } => "open_record",
            Self::SendEmail { .. } => "send_email",
            Self::Webhook { .. } => "webhook",
            Self::RunAutomation { .. } => "run_automation",
            Self::OpenUrl { .. } => "open_url",
            Self::SetFieldValue { .. } => "set_field_value",
            Self::CopyToClipboard { .. } => "copy_to_clipboard",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind.type_name(), self.id)
    }
}
