use mongodb::bson::{self, doc, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;

use super::present;

/// Body of `PUT /allServices/:id`.
///
/// Only these five fields can be replaced, with whatever value was sent
/// (including `null`). Unknown fields in the request are ignored and absent
/// ones are left untouched in the stored document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub photo: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub service_name: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub service_area: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
}

impl UpdateServiceRequest {
    /// Builds the `{ $set: {...} }` modifier for the present fields.
    pub fn to_update(&self) -> Result<Document, AppError> {
        let fields = bson::to_document(self).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode service update: {}", e))
        })?;

        if fields.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "At least one of photo, price, serviceName, serviceArea or description must be provided"
            )));
        }

        Ok(doc! { "$set": fields })
    }
}
