use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by a session token.
///
/// The login payload is accepted as-is, so `email` may hold any JSON value
/// and everything except the timing claims is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Builds the claim set for a login payload issued at `iat`.
    ///
    /// Caller-supplied `iat`/`exp` are discarded.
    pub fn from_payload(mut payload: Map<String, Value>, iat: i64, exp: i64) -> Self {
        payload.remove("iat");
        payload.remove("exp");
        let email = payload.remove("email").filter(|email| !email.is_null());

        Self {
            email,
            iat,
            exp,
            extra: payload,
        }
    }

    /// The email claim, when it is a string.
    pub fn email_address(&self) -> Option<&str> {
        self.email.as_ref().and_then(Value::as_str)
    }

    /// Exact, case-sensitive comparison against an owner email. A missing or
    /// non-string email claim owns nothing.
    pub fn owns(&self, owner_email: &str) -> bool {
        self.email_address() == Some(owner_email)
    }
}
