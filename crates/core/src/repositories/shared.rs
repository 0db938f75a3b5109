//! Shared repository utilities.
//!
//! Every service operation follows the same scoped acquisition: connect, run one store call,
//! close the handle on both the success and the error path, then hand back the result. If the
//! operation is dropped before it finishes (a client hanging up mid-request), the handle is
//! closed from a spawned task instead.

use crate::store::{StoreConnector, StoreHandle};
use crate::CatalogResult;
use std::ops::Deref;

/// An open store connection that is closed exactly once.
pub(crate) struct ScopedHandle {
    handle: Option<Box<dyn StoreHandle>>,
}

impl ScopedHandle {
    pub(crate) async fn open(connector: &dyn StoreConnector) -> CatalogResult<Self> {
        let handle = connector.connect().await?;
        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Close the connection and pass `result` through unchanged.
    pub(crate) async fn release<T>(mut self, result: CatalogResult<T>) -> CatalogResult<T> {
        if let Some(handle) = self.handle.take() {
            handle.close().await;
        }
        result
    }
}

impl Deref for ScopedHandle {
    type Target = dyn StoreHandle;

    fn deref(&self) -> &Self::Target {
        self.handle
            .as_deref()
            .expect("store handle is held until release")
    }
}

impl Drop for ScopedHandle {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::debug!("store operation abandoned; closing connection in background");
                runtime.spawn(handle.close());
            }
            Err(_) => tracing::warn!("store connection dropped outside a runtime; not closed"),
        }
    }
}
