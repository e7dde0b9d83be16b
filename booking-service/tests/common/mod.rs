//! Shared helpers for booking-service integration tests.
//!
//! Tests drive the real router with `tower::ServiceExt::oneshot` against an
//! in-memory store that records every call, so no MongoDB is required.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use booking_service::{
    build_router,
    config::{
        AuthConfig, BookingConfig, CorsConfig, Environment, MongoConfig, ObservabilityConfig,
        ServicesConfig,
    },
    services::{
        Collection, DeleteAck, DocumentStore, InsertAck, StoreError, TokenIssuer, UpdateAck,
    },
    AppState,
};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use secrecy::Secret;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    FindAll(Collection),
    FindOne(Collection, Document),
    Find(Collection, Document),
    InsertOne(Collection, Document),
    UpdateOne {
        collection: Collection,
        filter: Document,
        update: Document,
        upsert: bool,
    },
    DeleteOne(Collection, Document),
}

/// In-memory [`DocumentStore`] that keeps documents per collection and logs
/// every call made through it.
#[derive(Default)]
pub struct RecordingStore {
    docs: Mutex<HashMap<Collection, Vec<Document>>>,
    calls: Mutex<Vec<StoreCall>>,
    unavailable: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Inserts a document directly, bypassing the call log. Returns its id.
    pub fn seed(&self, collection: Collection, mut doc: Document) -> ObjectId {
        let oid = match doc.get("_id") {
            Some(Bson::ObjectId(oid)) => *oid,
            _ => {
                let oid = ObjectId::new();
                doc.insert("_id", oid);
                oid
            }
        };
        self.docs
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(doc);
        oid
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        self.docs
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn matching(&self, collection: Collection, filter: &Document) -> Vec<Document> {
        self.documents(collection)
            .into_iter()
            .filter(|doc| matches(doc, filter))
            .collect()
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn ping(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.record(StoreCall::FindAll(collection))?;
        Ok(self.documents(collection))
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.record(StoreCall::FindOne(collection, filter.clone()))?;
        Ok(self.matching(collection, &filter).into_iter().next())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Vec<Document>, StoreError> {
        self.record(StoreCall::Find(collection, filter.clone()))?;
        Ok(self.matching(collection, &filter))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertAck, StoreError> {
        self.record(StoreCall::InsertOne(collection, doc.clone()))?;
        let oid = self.seed(collection, doc);
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: Value::String(oid.to_hex()),
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateAck, StoreError> {
        self.record(StoreCall::UpdateOne {
            collection,
            filter: filter.clone(),
            update: update.clone(),
            upsert,
        })?;

        let set = update.get_document("$set").cloned().unwrap_or_default();
        let mut docs = self.docs.lock().unwrap();
        let entries = docs.entry(collection).or_default();

        if let Some(doc) = entries.iter_mut().find(|doc| matches(doc, &filter)) {
            let modified = set.iter().any(|(key, value)| doc.get(key) != Some(value));
            for (key, value) in set {
                doc.insert(key, value);
            }
            return Ok(UpdateAck {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateAck {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        }

        let mut created = filter.clone();
        created.extend(set);
        let upserted_id = match created.get("_id") {
            Some(Bson::ObjectId(oid)) => Value::String(oid.to_hex()),
            _ => Value::Null,
        };
        entries.push(created);

        Ok(UpdateAck {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(upserted_id),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteAck, StoreError> {
        self.record(StoreCall::DeleteOne(collection, filter.clone()))?;

        let mut docs = self.docs.lock().unwrap();
        let entries = docs.entry(collection).or_default();
        let deleted = match entries.iter().position(|doc| matches(doc, &filter)) {
            Some(index) => {
                entries.remove(index);
                1
            }
            None => 0,
        };

        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: deleted,
        })
    }

    async fn close(&self) {}
}

pub fn test_config(environment: Environment) -> BookingConfig {
    BookingConfig {
        common: service_core::config::Config::default(),
        environment,
        mongodb: MongoConfig {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: "booking_test".to_string(),
        },
        auth: AuthConfig {
            token_secret: Secret::new(TEST_SECRET.to_string()),
            token_ttl_seconds: 3600,
        },
        services: ServicesConfig {
            upsert_on_update: true,
        },
        cors: CorsConfig::default(),
        observability: ObservabilityConfig::default(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<RecordingStore>,
    pub issuer: TokenIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(test_config(Environment::Development), RecordingStore::new())
    }

    pub fn with(config: BookingConfig, store: RecordingStore) -> Self {
        let store = Arc::new(store);
        let state = AppState::new(config, store.clone()).expect("test state");
        let issuer = state.issuer.clone();

        TestApp {
            router: build_router(state),
            store,
            issuer,
        }
    }

    /// A valid session token for `email`.
    pub fn token_for(&self, email: &str) -> String {
        let mut payload = Map::new();
        payload.insert("email".to_string(), Value::String(email.to_string()));
        self.issuer.issue(payload).expect("token")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("router")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn get_with_cookie(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, format!("token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn assert_status(response: &Response<Body>, status: StatusCode) {
    assert_eq!(response.status(), status, "unexpected status");
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}
