//! Premade sandwich operations.
//!
//! Pure data operations over the `psb_premade` collection. Each sandwich carries a list of
//! ingredient references; identifiers that look like store identifiers are stored in native
//! form, everything else is stored as given. References are not checked against the ingredient
//! collection.

use crate::models::{NewSandwich, SandwichRecord, SandwichUpdate};
use crate::repositories::shared::ScopedHandle;
use crate::store::{Collection, StoreConnector};
use crate::CatalogResult;
use std::sync::Arc;

/// Service for premade sandwich records.
#[derive(Clone)]
pub struct SandwichService {
    connector: Arc<dyn StoreConnector>,
}

impl SandwichService {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self { connector }
    }

    /// Every stored sandwich, in store order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the store cannot be reached or the query fails.
    pub async fn list_all(&self) -> CatalogResult<Vec<SandwichRecord>> {
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.find_all(Collection::Sandwiches).await;
        let documents = handle.release(result).await?;

        Ok(documents.iter().map(SandwichRecord::from_document).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> CatalogResult<Option<SandwichRecord>> {
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.find_by_id(Collection::Sandwiches, id).await;
        let document = handle.release(result).await?;

        Ok(document.as_ref().map(SandwichRecord::from_document))
    }

    /// Store a new sandwich and return the identifier the store assigned.
    ///
    /// `is_available` defaults to `true`. Ingredient references are coerced with
    /// [`coerce_identifier`](crate::models::coerce_identifier).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the store cannot be reached or the insert fails.
    pub async fn add(&self, sandwich: NewSandwich) -> CatalogResult<String> {
        let name = sandwich.name.clone();
        let document = sandwich.into_document()?;
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.insert_one(Collection::Sandwiches, document).await;
        let id = handle.release(result).await?;

        tracing::info!(sandwich_id = %id, name = %name, "sandwich added");
        Ok(id)
    }

    /// Apply a partial update and return the number of modified records (0 or 1).
    ///
    /// Replacement ingredient lists are coerced the same way as on insert.
    pub async fn update(&self, id: &str, update: SandwichUpdate) -> CatalogResult<u64> {
        let changes = update.into_set_document()?;
        if changes.is_empty() {
            return Ok(0);
        }

        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.update_by_id(Collection::Sandwiches, id, changes).await;
        handle.release(result).await
    }

    pub async fn delete(&self, id: &str) -> CatalogResult<u64> {
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.delete_by_id(Collection::Sandwiches, id).await;
        let deleted = handle.release(result).await?;

        tracing::info!(sandwich_id = id, deleted, "sandwich delete");
        Ok(deleted)
    }
}
