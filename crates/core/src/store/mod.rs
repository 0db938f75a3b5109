//! Document store client.
//!
//! The services talk to the store through two traits:
//!
//! - [`StoreConnector`] opens a fresh, verified connection. One connection is opened per
//!   service operation (and so per HTTP request).
//! - [`StoreHandle`] is that connection. It exposes raw CRUD over the two named collections
//!   and must be released with [`StoreHandle::close`] once the operation has finished,
//!   whether it succeeded or not.
//!
//! Two backends are provided: [`MongoConnector`] for the real cluster and [`MemoryStore`] for
//! local development and tests.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoConnector;

use crate::config::{CoreConfig, StoreBackend};
use crate::constants::{INGREDIENTS_COLLECTION, SANDWICHES_COLLECTION};
use crate::{CatalogError, CatalogResult};
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use std::sync::Arc;

/// The collections known to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Ingredients,
    Sandwiches,
}

impl Collection {
    /// Name of the collection in the database.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Ingredients => INGREDIENTS_COLLECTION,
            Collection::Sandwiches => SANDWICHES_COLLECTION,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Opens connections to a document store.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a new connection and verify the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Connectivity` if the store cannot be reached.
    async fn connect(&self) -> CatalogResult<Box<dyn StoreHandle>>;
}

/// A single open connection to the store.
#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// All documents of `collection`, in store order.
    async fn find_all(&self, collection: Collection) -> CatalogResult<Vec<Document>>;

    /// The document with the given identifier.
    ///
    /// A malformed identifier cannot match anything and yields `Ok(None)`.
    async fn find_by_id(&self, collection: Collection, id: &str)
        -> CatalogResult<Option<Document>>;

    /// Insert `document` and return the identifier the store assigned to it.
    async fn insert_one(&self, collection: Collection, document: Document) -> CatalogResult<String>;

    /// Apply `changes` as a field-level `$set` and return the number of modified documents.
    async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        changes: Document,
    ) -> CatalogResult<u64>;

    /// Delete the document with the given identifier and return the number deleted.
    async fn delete_by_id(&self, collection: Collection, id: &str) -> CatalogResult<u64>;

    /// Release the connection.
    async fn close(self: Box<Self>);
}

/// Parse a store identifier (24 hexadecimal characters).
pub fn parse_object_id(id: &str) -> CatalogResult<ObjectId> {
    ObjectId::parse_str(id.trim()).map_err(|_| CatalogError::InvalidId(id.to_string()))
}

/// Build the connector selected by `cfg`.
///
/// No connection is attempted here. Only missing configuration fails; an unreachable store is
/// reported by [`StoreConnector::connect`] on each request.
pub fn connector_from_config(cfg: &CoreConfig) -> CatalogResult<Arc<dyn StoreConnector>> {
    match cfg.store_backend() {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Mongo => {
            let store_cfg = cfg.store().ok_or_else(|| {
                CatalogError::Config(crate::constants::MISSING_DB_ENV_MESSAGE.into())
            })?;
            Ok(Arc::new(MongoConnector::new(store_cfg)))
        }
    }
}
