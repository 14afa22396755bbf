//! `SQLite` implementation of [`DataStore`].
//!
//! Every application table shares one `records` table keyed by
//! `(table_name, id)`. Fields are stored as a JSON object, identity and
//! audit fields included, so a stored record reads back unchanged.

use sqlx::SqlitePool;

use autoflow_app::ports::DataStore;
use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::{RecordId, TableRef};
use autoflow_domain::record::{FieldValue, Fields, ID_FIELD, Record};
use autoflow_domain::time::{format_rfc3339, now};

use crate::error::StorageError;

const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

const INSERT: &str = r"
    INSERT INTO records (table_name, id, fields, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?)
";
const UPDATE: &str =
    "UPDATE records SET fields = ?, updated_at = ? WHERE table_name = ? AND id = ?";
const SELECT_FIELDS: &str = "SELECT fields FROM records WHERE table_name = ? AND id = ?";
const DELETE: &str = "DELETE FROM records WHERE table_name = ? AND id = ?";

fn decode(fields_json: &str) -> Result<Record, StorageError> {
    Ok(serde_json::from_str(fields_json)?)
}

/// `SQLite`-backed record store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Create a new record store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DataStore for SqliteRecordStore {
    async fn get(&self, table: &TableRef, id: &RecordId) -> Result<Option<Record>, AutoflowError> {
        let row: Option<(String,)> = sqlx::query_as(SELECT_FIELDS)
            .bind(table.as_str())
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|(json,)| decode(&json)).transpose()?)
    }

    async fn insert(&self, table: &TableRef, fields: Fields) -> Result<Record, AutoflowError> {
        let mut record = Record::from_fields(fields);
        let id = record
            .id()
            .unwrap_or_else(|| RecordId::new(uuid::Uuid::new_v4().to_string()));
        let timestamp = now();
        record.set(ID_FIELD, id.as_str());
        record.set(CREATED_AT, FieldValue::date(timestamp));
        record.set(UPDATED_AT, FieldValue::date(timestamp));
        let fields_json = serde_json::to_string(&record).map_err(StorageError::from)?;
        let stamp = format_rfc3339(&timestamp);

        sqlx::query(INSERT)
            .bind(table.as_str())
            .bind(id.as_str())
            .bind(&fields_json)
            .bind(&stamp)
            .bind(&stamp)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        tracing::debug!(%table, %id, "record inserted");
        Ok(record)
    }

    async fn update(
        &self,
        table: &TableRef,
        id: &RecordId,
        updates: Fields,
    ) -> Result<Option<Record>, AutoflowError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let row: Option<(String,)> = sqlx::query_as(SELECT_FIELDS)
            .bind(table.as_str())
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        let Some((current,)) = row else {
            return Ok(None);
        };

        let mut record = decode(&current)?;
        record.merge(&updates);
        // identity is owned by the store
        record.set(ID_FIELD, id.as_str());
        let timestamp = now();
        record.set(UPDATED_AT, FieldValue::date(timestamp));
        let fields_json = serde_json::to_string(&record).map_err(StorageError::from)?;

        sqlx::query(UPDATE)
            .bind(&fields_json)
            .bind(format_rfc3339(&timestamp))
            .bind(table.as_str())
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;

        Ok(Some(record))
    }

    async fn delete(&self, table: &TableRef, id: &RecordId) -> Result<bool, AutoflowError> {
        let result = sqlx::query(DELETE)
            .bind(table.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
