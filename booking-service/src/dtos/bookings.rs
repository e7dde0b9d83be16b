use mongodb::bson::{self, doc, Document};
use serde::Deserialize;
use serde_json::Value;
use service_core::error::AppError;
use validator::Validate;

use super::present;

/// Body of `PATCH /allBookings/:id`. Everything but `status` is ignored.
///
/// Only presence is checked; any JSON value, `null` included, is written.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBookingStatusRequest {
    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "status is required"))]
    pub status: Option<Value>,
}

impl UpdateBookingStatusRequest {
    /// `{ $set: { status } }`; call after `validate()`.
    pub fn to_update(&self) -> Result<Document, AppError> {
        let status = bson::to_bson(&self.status.clone().unwrap_or(Value::Null)).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode booking status: {}", e))
        })?;

        Ok(doc! { "$set": { "status": status } })
    }
}
