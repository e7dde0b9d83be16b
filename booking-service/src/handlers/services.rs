//! `/allServices` and `/myService/:email`.
//!
//! Each handler performs exactly one store call and returns its raw result
//! with 200, including empty results and `null` lookups.

use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::{self, doc};
use serde_json::{Map, Value};
use service_core::error::AppError;

use crate::dtos::UpdateServiceRequest;
use crate::middleware::OwnerEmail;
use crate::services::{Collection, DeleteAck, InsertAck, UpdateAck};
use crate::startup::AppState;
use crate::utils::{document_to_json, documents_to_json, id_filter};

#[tracing::instrument(skip(state))]
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let services = state.store.find_all(Collection::Services).await?;
    Ok(Json(documents_to_json(services)))
}

#[tracing::instrument(skip(state))]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = state
        .store
        .find_one(Collection::Services, id_filter(&id)?)
        .await?;

    Ok(Json(service.map(document_to_json).unwrap_or(Value::Null)))
}

/// Services listed by the authenticated provider.
#[tracing::instrument(skip(state))]
pub async fn my_services(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<Value>, AppError> {
    let services = state
        .store
        .find(Collection::Services, doc! { "providerEmail": email.as_str() })
        .await?;

    Ok(Json(documents_to_json(services)))
}

/// Stores the posted object exactly as sent.
#[tracing::instrument(skip(state, service))]
pub async fn create_service(
    State(state): State<AppState>,
    Json(service): Json<Map<String, Value>>,
) -> Result<Json<InsertAck>, AppError> {
    let document = bson::to_document(&service).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to encode service: {}", e))
    })?;

    let ack = state
        .store
        .insert_one(Collection::Services, document)
        .await?;

    tracing::info!(
        inserted_id = %ack.inserted_id,
        provider_email = service
            .get("providerEmail")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-"),
        "Created service"
    );

    Ok(Json(ack))
}

/// Replaces the updatable subset of a service.
///
/// With `upsert_on_update` enabled an unknown id creates a new document
/// holding only the submitted fields.
#[tracing::instrument(skip(state, request))]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<UpdateAck>, AppError> {
    let filter = id_filter(&id)?;
    let update = request.to_update()?;
    let upsert = state.config.services.upsert_on_update;

    let ack = state
        .store
        .update_one(Collection::Services, filter, update, upsert)
        .await?;

    if let Some(upserted_id) = &ack.upserted_id {
        tracing::warn!(
            service_id = %id,
            upserted_id = %upserted_id,
            "Service update matched nothing and created a new document"
        );
    }

    Ok(Json(ack))
}

#[tracing::instrument(skip(state))]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, AppError> {
    let ack = state
        .store
        .delete_one(Collection::Services, id_filter(&id)?)
        .await?;

    Ok(Json(ack))
}
