use super::store::{Collection, DeleteAck, DocumentStore, InsertAck, StoreError, UpdateAck};
use crate::utils::bson_to_json;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion, UpdateOptions},
    Client as MongoClient, Database,
};

/// [`DocumentStore`] backed by a MongoDB deployment.
#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        tracing::info!(database = %database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            StoreError::from(e)
        })?;
        options.app_name = Some("booking-service".to_string());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = MongoClient::with_options(options)?;
        let db = client.database(database);
        tracing::info!(database = %database, "MongoDB client ready");

        Ok(Self { client, db })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.name())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB ping failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection).find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.collection(collection).find_one(filter, None).await?)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection).find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertAck, StoreError> {
        let result = self.collection(collection).insert_one(doc, None).await?;
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: bson_to_json(result.inserted_id),
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateAck, StoreError> {
        let options = UpdateOptions::builder().upsert(upsert).build();
        let result = self
            .collection(collection)
            .update_one(filter, update, options)
            .await?;

        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id.map(bson_to_json),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteAck, StoreError> {
        let result = self.collection(collection).delete_one(filter, None).await?;
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn close(&self) {
        tracing::info!("Closing MongoDB connections");
        self.client.clone().shutdown().await;
    }
}
