//! MongoDB backend.

use super::{parse_object_id, Collection, StoreConnector, StoreHandle};
use crate::config::StoreConfig;
use crate::constants::ADMIN_DB_NAME;
use crate::{CatalogError, CatalogResult};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, Credential, ServerApi, ServerApiVersion};
use mongodb::{Client, Database};
use tokio::sync::OnceCell;

/// Opens one MongoDB client per connection request.
///
/// Building the connector does no I/O. The `mongodb+srv` string is resolved (DNS lookups) on
/// the first `connect` and the resulting options are reused; a failed resolution is retried by
/// the next request, so an unreachable cluster surfaces as a per-request connectivity error.
pub struct MongoConnector {
    config: StoreConfig,
    options: OnceCell<ClientOptions>,
}

impl MongoConnector {
    pub fn new(cfg: &StoreConfig) -> Self {
        tracing::info!(
            uri = %cfg.connection_uri(),
            app_name = %cfg.app_name(),
            "configured MongoDB store"
        );

        Self {
            config: cfg.clone(),
            options: OnceCell::new(),
        }
    }

    async fn client_options(&self) -> CatalogResult<ClientOptions> {
        let options = self
            .options
            .get_or_try_init(|| resolve_options(&self.config))
            .await?;
        Ok(options.clone())
    }
}

async fn resolve_options(cfg: &StoreConfig) -> CatalogResult<ClientOptions> {
    let mut options = ClientOptions::parse(cfg.connection_uri())
        .await
        .map_err(|e| {
            tracing::error!("MongoDB connection error: {e}");
            CatalogError::Connectivity(e.to_string())
        })?;

    let mut credential = Credential::default();
    credential.username = Some(cfg.user().to_string());
    credential.password = Some(cfg.password().to_string());

    options.credential = Some(credential);
    options.app_name = Some(cfg.app_name().to_string());
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
    Ok(options)
}

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self) -> CatalogResult<Box<dyn StoreHandle>> {
        let client = Client::with_options(self.client_options().await?)
            .map_err(|e| CatalogError::Connectivity(e.to_string()))?;

        if let Err(e) = client
            .database(ADMIN_DB_NAME)
            .run_command(doc! { "ping": 1 })
            .await
        {
            tracing::error!("MongoDB connection error: {e}");
            client.shutdown().await;
            return Err(CatalogError::Connectivity(e.to_string()));
        }
        tracing::debug!("Ping");

        Ok(Box::new(MongoHandle {
            database: client.database(self.config.db_name()),
            client,
        }))
    }
}

struct MongoHandle {
    client: Client,
    database: Database,
}

impl MongoHandle {
    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(collection.name())
    }
}

#[async_trait]
impl StoreHandle for MongoHandle {
    async fn find_all(&self, collection: Collection) -> CatalogResult<Vec<Document>> {
        let cursor = self.collection(collection).find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> CatalogResult<Option<Document>> {
        let Ok(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        Ok(self.collection(collection).find_one(doc! { "_id": oid }).await?)
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> CatalogResult<String> {
        let result = self.collection(collection).insert_one(document).await?;
        Ok(match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.to_string(),
        })
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        changes: Document,
    ) -> CatalogResult<u64> {
        let oid = parse_object_id(id)?;
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": oid }, doc! { "$set": changes })
            .await?;
        Ok(result.modified_count)
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> CatalogResult<u64> {
        let oid = parse_object_id(id)?;
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": oid })
            .await?;
        Ok(result.deleted_count)
    }

    async fn close(self: Box<Self>) {
        let MongoHandle { client, .. } = *self;
        client.shutdown().await;
        tracing::debug!("MongoDB connection closed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolvable() -> StoreConfig {
        StoreConfig::from_env_values(
            Some("psb".into()),
            Some("secret".into()),
            Some("no-such-cluster.invalid".into()),
            Some("psb-tests".into()),
            None,
        )
        .expect("complete settings")
    }

    #[tokio::test]
    async fn test_unresolvable_cluster_fails_per_connection() {
        let connector = MongoConnector::new(&unresolvable());

        for _ in 0..2 {
            let err = match connector.connect().await {
                Ok(_) => panic!("an .invalid host must not resolve"),
                Err(e) => e,
            };
            assert!(matches!(err, CatalogError::Connectivity(_)), "got {err:?}");
        }
        assert!(connector.options.get().is_none());
    }
}
