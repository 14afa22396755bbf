//! `SQLite` implementation of [`AutomationRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use autoflow_app::ports::AutomationRepository;
use autoflow_domain::automation::{Action, Automation, AutomationStatus, Condition, Trigger};
use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::AutomationId;

use crate::error::{StorageError, decode_error};

const INSERT: &str = "INSERT INTO automations (id, name, status, trigger_data, conditions, actions) VALUES (?, ?, ?, ?, ?, ?)";
const UPDATE: &str = "UPDATE automations SET name = ?, status = ?, trigger_data = ?, conditions = ?, actions = ? WHERE id = ?";
const SELECT_BY_ID: &str = "SELECT * FROM automations WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM automations ORDER BY name";
const SELECT_ACTIVE: &str = "SELECT * FROM automations WHERE status = 'active' ORDER BY name";
const DELETE: &str = "DELETE FROM automations WHERE id = ?";

fn status_to_str(status: AutomationStatus) -> &'static str {
    match status {
        AutomationStatus::Active => "active",
        AutomationStatus::Paused => "paused",
    }
}

fn status_from_str(value: &str) -> Result<AutomationStatus, sqlx::Error> {
    match value {
        "active" => Ok(AutomationStatus::Active),
        "paused" => Ok(AutomationStatus::Paused),
        other => Err(sqlx::Error::Decode(
            format!("unknown automation status `{other}`").into(),
        )),
    }
}

struct Wrapper(Automation);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Automation> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let status: String = row.try_get("status")?;
        let trigger_json: String = row.try_get("trigger_data")?;
        let conditions_json: String = row.try_get("conditions")?;
        let actions_json: String = row.try_get("actions")?;

        let trigger: Trigger = serde_json::from_str(&trigger_json).map_err(decode_error)?;
        let conditions: Vec<Condition> =
            serde_json::from_str(&conditions_json).map_err(decode_error)?;
        let actions: Vec<Action> = serde_json::from_str(&actions_json).map_err(decode_error)?;

        Ok(Self(Automation {
            id: AutomationId::from_uuid(id),
            name,
            status: status_from_str(&status)?,
            trigger,
            conditions,
            actions,
        }))
    }
}

/// Serialized JSON columns of one automation.
struct Columns {
    trigger: String,
    conditions: String,
    actions: String,
}

impl Columns {
    fn of(automation: &Automation) -> Result<Self, StorageError> {
        Ok(Self {
            trigger: serde_json::to_string(&automation.trigger)?,
            conditions: serde_json::to_string(&automation.conditions)?,
            actions: serde_json::to_string(&automation.actions)?,
        })
    }
}

/// `SQLite`-backed automation repository.
#[derive(Clone)]
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationRepository for SqliteAutomationRepository {
    async fn create(&self, automation: Automation) -> Result<Automation, AutoflowError> {
        let columns = Columns::of(&automation)?;

        sqlx::query(INSERT)
            .bind(automation.id.as_uuid())
            .bind(&automation.name)
            .bind(status_to_str(automation.status))
            .bind(&columns.trigger)
            .bind(&columns.conditions)
            .bind(&columns.actions)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn get_by_id(&self, id: AutomationId) -> Result<Option<Automation>, AutoflowError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Automation>, AutoflowError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_active(&self) -> Result<Vec<Automation>, AutoflowError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ACTIVE)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, automation: Automation) -> Result<Automation, AutoflowError> {
        let columns = Columns::of(&automation)?;

        sqlx::query(UPDATE)
            .bind(&automation.name)
            .bind(status_to_str(automation.status))
            .bind(&columns.trigger)
            .bind(&columns.conditions)
            .bind(&columns.actions)
            .bind(automation.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn delete(&self, id: AutomationId) -> Result<(), AutoflowError> {
        sqlx::query(DELETE)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
