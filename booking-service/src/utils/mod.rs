//! Conversions between stored BSON and the JSON sent to clients.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde_json::{Map, Number, Value};
use service_core::error::AppError;

/// Renders a stored value the way the web client expects it: object ids as
/// hex strings, dates as RFC 3339 strings, numbers as plain JSON numbers.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(dt.timestamp_millis())),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::Null | Bson::Undefined => Value::Null,
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    Value::Object(
        doc.into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect::<Map<String, Value>>(),
    )
}

pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_json).collect())
}

/// `{ _id: ObjectId(id) }`.
///
/// A malformed id is a server-side failure (500), not a client error.
pub fn id_filter(id: &str) -> Result<Document, AppError> {
    let oid = ObjectId::parse_str(id).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Invalid object id '{}': {}", id, e))
    })?;
    Ok(doc! { "_id": oid })
}
