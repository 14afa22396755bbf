//! `SQLite` implementation of [`AutomationLogStore`].

use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use autoflow_app::ports::AutomationLogStore;
use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::{AutomationId, LogId};
use autoflow_domain::log::{AutomationLog, LogStatus};

use crate::error::{StorageError, decode_error};

struct Wrapper(AutomationLog);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let automation_id: uuid::Uuid = row.try_get("automation_id")?;
        let timestamp_str: String = row.try_get("timestamp")?;
        let status: String = row.try_get("status")?;
        let duration_ms: i64 = row.try_get("duration_ms")?;
        let input_json: String = row.try_get("input")?;
        let output_json: String = row.try_get("output")?;
        let error: Option<String> = row.try_get("error")?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(decode_error)?
            .to_utc();
        let status: LogStatus = status
            .parse()
            .map_err(|msg: String| sqlx::Error::Decode(msg.into()))?;

        Ok(Self(AutomationLog {
            id: LogId::from_uuid(id),
            automation_id: AutomationId::from_uuid(automation_id),
            timestamp,
            status,
            duration_ms: u64::try_from(duration_ms).unwrap_or_default(),
            input: serde_json::from_str(&input_json).map_err(decode_error)?,
            output: serde_json::from_str(&output_json).map_err(decode_error)?,
            error,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO automation_logs (id, automation_id, timestamp, status, duration_ms, input, output, error)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

// rowid breaks ties between entries written within the same microsecond
const SELECT_BY_AUTOMATION: &str = "SELECT * FROM automation_logs WHERE automation_id = ? ORDER BY timestamp DESC, rowid DESC LIMIT ?";

/// `SQLite`-backed, append-only automation log.
#[derive(Clone)]
pub struct SqliteAutomationLogStore {
    pool: SqlitePool,
}

impl SqliteAutomationLogStore {
    /// Create a new log store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationLogStore for SqliteAutomationLogStore {
    async fn append(&self, log: AutomationLog) -> Result<AutomationLog, AutoflowError> {
        let input_json = serde_json::to_string(&log.input).map_err(StorageError::from)?;
        let output_json = serde_json::to_string(&log.output).map_err(StorageError::from)?;

        // fixed-width timestamps keep the text column sortable
        sqlx::query(INSERT)
            .bind(log.id.as_uuid())
            .bind(log.automation_id.as_uuid())
            .bind(log.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
            .bind(log.status.as_str())
            .bind(i64::try_from(log.duration_ms).unwrap_or(i64::MAX))
            .bind(&input_json)
            .bind(&output_json)
            .bind(log.error.as_deref())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(log)
    }

    async fn find_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> Result<Vec<AutomationLog>, AutoflowError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_AUTOMATION)
            .bind(automation_id.as_uuid())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use serde_json::json;

    async fn setup() -> SqliteAutomationLogStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteAutomationLogStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn should_append_and_read_back_log() {
        let store = setup().await;
        let automation_id = AutomationId::new();
        let log = AutomationLog::failure(
            automation_id,
            42,
            json!({"source": "manual"}),
            json!({"results": []}),
            "Webhook returned HTTP 500",
        );
        let id = log.id;

        store.append(log).await.unwrap();
        let logs = store.find_by_automation(automation_id, 10).await.unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, id);
        assert_eq!(logs[0].status, LogStatus::Error);
        assert_eq!(logs[0].duration_ms, 42);
        assert_eq!(logs[0].input, json!({"source": "manual"}));
        assert_eq!(logs[0].error.as_deref(), Some("Webhook returned HTTP 500"));
    }

    #[tokio::test]
    async fn should_return_newest_first_and_respect_limit() {
        let store = setup().await;
        let automation_id = AutomationId::new();
        for ms in [1, 2, 3] {
            store
                .append(AutomationLog::success(automation_id, ms, json!({}), json!({})))
                .await
                .unwrap();
        }

        let logs = store.find_by_automation(automation_id, 2).await.unwrap();
        let durations: Vec<u64> = logs.iter().map(|log| log.duration_ms).collect();
        assert_eq!(durations, vec![3, 2]);
        assert!(logs.iter().all(AutomationLog::is_success));
    }

    #[tokio::test]
    async fn should_only_return_logs_of_requested_automation() {
        let store = setup().await;
        let mine = AutomationId::new();
        store
            .append(AutomationLog::success(mine, 1, json!({}), json!({})))
            .await
            .unwrap();
        store
            .append(AutomationLog::success(AutomationId::new(), 2, json!({}), json!({})))
            .await
            .unwrap();

        let logs = store.find_by_automation(mine, 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].automation_id, mine);
    }
}
