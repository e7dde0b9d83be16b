pub mod bookings;
pub mod services;

pub use bookings::UpdateBookingStatusRequest;
pub use services::UpdateServiceRequest;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a field that is present in the body, keeping an explicit
/// `null` as `Some(Value::Null)`. Pair with `#[serde(default)]` so an absent
/// field stays `None`.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
