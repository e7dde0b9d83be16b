//! The document-store seam.
//!
//! Handlers talk to [`DocumentStore`] only; [`super::MongoStore`] is the
//! production implementation. Filters are always single-field equality on
//! `_id` or an owner email.

use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::error::ErrorKind;
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;
use std::fmt;
use thiserror::Error;

/// The two collections of the marketplace database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Bookings,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Services => "allServices",
            Collection::Bookings => "allBookings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(mongodb::error::Error),

    /// No server could be selected within the driver's timeout.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match *err.kind {
            ErrorKind::ServerSelection { .. } => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Mongo(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// Acknowledgement of an insert, shaped like the MongoDB driver's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Round-trip to the server; used by readiness probes and at startup.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, StoreError>;

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertAck, StoreError>;

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateAck, StoreError>;

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteAck, StoreError>;

    /// Releases the connection pool. Called once after the server stops.
    async fn close(&self);
}
