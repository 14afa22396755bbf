//! Client port — best-effort side effects in the user's client
//! (navigation, new tabs, clipboard).
//!
//! A failure here fails only the client-side action itself; data changes
//! made by earlier actions stay committed.

use std::future::Future;
use std::sync::Arc;

use autoflow_domain::id::{PageId, RecordId, TableRef};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),
}

pub trait ClientPort {
    fn navigate(&self, page_id: &PageId) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn open_record(
        &self,
        table: &TableRef,
        record_id: &RecordId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn open_url(&self, url: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn copy_to_clipboard(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl<T: ClientPort + Send + Sync> ClientPort for Arc<T> {
    fn navigate(&self, page_id: &PageId) -> impl Future<Output = Result<(), ClientError>> + Send {
        (**self).navigate(page_id)
    }

    fn open_record(
        &self,
        table: &TableRef,
        record_id: &RecordId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        (**self).open_record(table, record_id)
    }

    fn open_url(&self, url: &str) -> impl Future<Output = Result<(), ClientError>> + Send {
        (**self).open_url(url)
    }

    fn copy_to_clipboard(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        (**self).copy_to_clipboard(text)
    }
}

/// A client that performs nothing itself: every effect is accepted and
/// travels back to the caller in the action's result data.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredClient;

impl ClientPort for DeferredClient {
    async fn navigate(&self, _page_id: &PageId) -> Result<(), ClientError> {
        Ok(())
    }

    async fn open_record(
        &self,
        _table: &TableRef,
        _record_id: &RecordId,
    ) -> Result<(), ClientError> {
        Ok(())
    }

    async fn open_url(&self, _url: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn copy_to_clipboard(&self, _text: &str) -> Result<(), ClientError> {
        Ok(())
    }
}
