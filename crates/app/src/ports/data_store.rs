//! Data port — the record store the actions read and write.
//!
//! The record store is a collaborator: it exposes select/insert/update/delete
//! by id over named tables. "Not found" is a regular outcome (`None` /
//! `false`), never an error.

use std::future::Future;
use std::sync::Arc;

use autoflow_domain::error::AutoflowError;
use autoflow_domain::id::{RecordId, TableRef};
use autoflow_domain::record::{Fields, Record};

pub trait DataStore {
    /// Fetch one record.
    fn get(
        &self,
        table: &TableRef,
        id: &RecordId,
    ) -> impl Future<Output = Result<Option<Record>, AutoflowError>> + Send;

    /// Insert a record and return it as stored (with its new `id`).
    fn insert(
        &self,
        table: &TableRef,
        fields: Fields,
    ) -> impl Future<Output = Result<Record, AutoflowError>> + Send;

    /// Patch a record; returns the updated record, or `None` if absent.
    fn update(
        &self,
        table: &TableRef,
        id: &RecordId,
        updates: Fields,
    ) -> impl Future<Output = Result<Option<Record>, AutoflowError>> + Send;

    /// Delete a record; returns `false` if it did not exist.
    fn delete(
        &self,
        table: &TableRef,
        id: &RecordId,
    ) -> impl Future<Output = Result<bool, AutoflowError>> + Send;
}

impl<T: DataStore + Send + Sync> DataStore for Arc<T> {
    fn get(
        &self,
        table: &TableRef,
        id: &RecordId,
    ) -> impl Future<Output = Result<Option<Record>, AutoflowError>> + Send {
        (**self).get(table, id)
    }

    fn insert(
        &self,
        table: &TableRef,
        fields: Fields,
    ) -> impl Future<Output = Result<Record, AutoflowError>> + Send {
        (**self).insert(table, fields)
    }

    fn update(
        &self,
        table: &TableRef,
        id: &RecordId,
        updates: Fields,
    ) -> impl Future<Output = Result<Option<Record>, AutoflowError>> + Send {
        (**self).update(table, id, updates)
    }

    fn delete(
        &self,
        table: &TableRef,
        id: &RecordId,
    ) -> impl Future<Output = Result<bool, AutoflowError>> + Send {
        (**self).delete(table, id)
    }
}
