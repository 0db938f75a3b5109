//! Ingredient operations.
//!
//! Pure data operations over the `psb_ingredients` collection. Response shaping (for example
//! the positional `id` in list responses) belongs to the API layer.

use crate::models::{IngredientRecord, IngredientUpdate, NewIngredient};
use crate::repositories::shared::ScopedHandle;
use crate::store::{Collection, StoreConnector};
use crate::CatalogResult;
use std::sync::Arc;

/// Service for ingredient records.
#[derive(Clone)]
pub struct IngredientService {
    connector: Arc<dyn StoreConnector>,
}

impl IngredientService {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self { connector }
    }

    /// Every stored ingredient, in store order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the store cannot be reached or the query fails.
    pub async fn list_all(&self) -> CatalogResult<Vec<IngredientRecord>> {
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.find_all(Collection::Ingredients).await;
        let documents = handle.release(result).await?;

        Ok(documents
            .iter()
            .map(IngredientRecord::from_document)
            .collect())
    }

    /// The ingredient with the given identifier, if any.
    ///
    /// A malformed identifier is treated as "not found".
    pub async fn get_by_id(&self, id: &str) -> CatalogResult<Option<IngredientRecord>> {
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.find_by_id(Collection::Ingredients, id).await;
        let document = handle.release(result).await?;

        Ok(document.as_ref().map(IngredientRecord::from_document))
    }

    /// Store a new ingredient and return the identifier the store assigned.
    ///
    /// `is_available` is stored as `true` when the caller left it out.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the store cannot be reached or the insert fails.
    pub async fn add(&self, ingredient: NewIngredient) -> CatalogResult<String> {
        let name = ingredient.name.clone();
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle
            .insert_one(Collection::Ingredients, ingredient.into_document())
            .await;
        let id = handle.release(result).await?;

        tracing::info!(ingredient_id = %id, name = %name, "ingredient added");
        Ok(id)
    }

    /// Apply a partial update and return the number of modified records (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidId` if `id` is not a store identifier.
    pub async fn update(&self, id: &str, update: IngredientUpdate) -> CatalogResult<u64> {
        let changes = update.into_set_document();
        if changes.is_empty() {
            return Ok(0);
        }

        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle
            .update_by_id(Collection::Ingredients, id, changes)
            .await;
        handle.release(result).await
    }

    /// Delete an ingredient and return the number of deleted records (0 or 1).
    ///
    /// Sandwiches referring to the ingredient are left untouched.
    pub async fn delete(&self, id: &str) -> CatalogResult<u64> {
        let handle = ScopedHandle::open(self.connector.as_ref()).await?;
        let result = handle.delete_by_id(Collection::Ingredients, id).await;
        let deleted = handle.release(result).await?;

        tracing::info!(ingredient_id = id, deleted, "ingredient delete");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::shared::test_support::BrokenStore;
    use crate::store::MemoryStore;
    use crate::CatalogError;
    use psb_types::NonEmptyText;

    fn sourdough() -> NewIngredient {
        NewIngredient {
            name: NonEmptyText::new("Sourdough Bread").expect("name"),
            kind: "bread".into(),
            description: "Crusty, tangy sourdough bread.".into(),
            tags: vec!["artisan".into(), "specialty".into()],
            is_available: None,
        }
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let service = IngredientService::new(Arc::new(MemoryStore::new()));

        let id = service.add(sourdough()).await.expect("add");
        let all = service.list_all().await.expect("list");

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].name, "Sourdough Bread");
        assert_eq!(all[0].kind, "bread");
        assert_eq!(all[0].tags, ["artisan", "specialty"]);
        assert!(all[0].is_available);
    }

    #[tokio::test]
    async fn test_add_keeps_explicit_unavailable() {
        let service = IngredientService::new(Arc::new(MemoryStore::new()));
        let mut ingredient = sourdough();
        ingredient.is_available = Some(false);

        let id = service.add(ingredient).await.expect("add");
        let stored = service
            .get_by_id(&id)
            .await
            .expect("get")
            .expect("ingredient should exist");
        assert!(!stored.is_available);
    }

    #[tokio::test]
    async fn test_list_all_is_repeatable() {
        let service = IngredientService::new(Arc::new(MemoryStore::new()));
        for name in ["Ham", "Turkey", "Swiss"] {
            let mut ingredient = sourdough();
            ingredient.name = NonEmptyText::new(name).expect("name");
            service.add(ingredient).await.expect("add");
        }

        let first = service.list_all().await.expect("list");
        let second = service.list_all().await.expect("list");
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = IngredientService::new(Arc::new(MemoryStore::new()));
        let id = service.add(sourdough()).await.expect("add");

        let update = IngredientUpdate {
            is_available: Some(false),
            ..Default::default()
        };
        assert_eq!(service.update(&id, update).await.expect("update"), 1);
        assert_eq!(
            service
                .update(&id, IngredientUpdate::default())
                .await
                .expect("empty update"),
            0
        );

        assert_eq!(service.delete(&id).await.expect("delete"), 1);
        assert!(service.get_by_id(&id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let service = IngredientService::new(Arc::new(MemoryStore::new()));

        assert!(service.get_by_id("nope").await.expect("get").is_none());
        assert!(matches!(
            service.delete("nope").await,
            Err(CatalogError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_handle_closed_when_store_fails() {
        let store = BrokenStore::default();
        let service = IngredientService::new(Arc::new(store.clone()));

        assert!(service.list_all().await.is_err());
        assert!(service.add(sourdough()).await.is_err());
        assert_eq!(store.closed_count(), 2);
    }
}
