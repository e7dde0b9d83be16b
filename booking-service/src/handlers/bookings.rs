//! `/allBookings` and `/myBooking/:email`.

use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::{self, doc};
use serde_json::{Map, Value};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::UpdateBookingStatusRequest;
use crate::middleware::OwnerEmail;
use crate::services::{Collection, InsertAck, UpdateAck};
use crate::startup::AppState;
use crate::utils::{documents_to_json, id_filter};

#[tracing::instrument(skip(state))]
pub async fn list_bookings(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let bookings = state.store.find_all(Collection::Bookings).await?;
    Ok(Json(documents_to_json(bookings)))
}

/// Bookings made by the authenticated user.
#[tracing::instrument(skip(state))]
pub async fn my_bookings(
    State(state): State<AppState>,
    OwnerEmail(email): OwnerEmail,
) -> Result<Json<Value>, AppError> {
    let bookings = state
        .store
        .find(Collection::Bookings, doc! { "userEmail": email.as_str() })
        .await?;

    Ok(Json(documents_to_json(bookings)))
}

/// Stores the posted object exactly as sent.
#[tracing::instrument(skip(state, booking))]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(booking): Json<Map<String, Value>>,
) -> Result<Json<InsertAck>, AppError> {
    let document = bson::to_document(&booking).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to encode booking: {}", e))
    })?;

    let ack = state
        .store
        .insert_one(Collection::Bookings, document)
        .await?;

    tracing::info!(
        inserted_id = %ack.inserted_id,
        user_email = booking
            .get("userEmail")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-"),
        "Created booking"
    );

    Ok(Json(ack))
}

/// Changes a booking's `status`; nothing else in the body is applied.
#[tracing::instrument(skip(state, request))]
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<UpdateAck>, AppError> {
    request.validate()?;
    let filter = id_filter(&id)?;
    let update = request.to_update()?;

    let ack = state
        .store
        .update_one(Collection::Bookings, filter, update, false)
        .await?;

    tracing::info!(
        booking_id = %id,
        status = ?request.status,
        matched = ack.matched_count,
        "Updated booking status"
    );

    Ok(Json(ack))
}
