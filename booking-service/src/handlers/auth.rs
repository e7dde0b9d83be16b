//! Session endpoints: `POST /jwt` and `POST /logOut`.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Map, Value};
use service_core::error::AppError;

use crate::services::record_token_issued;
use crate::startup::AppState;

/// Mints a session token for the posted identity and sets it as the
/// `token` cookie. The payload is not validated.
#[tracing::instrument(skip(state, jar, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<Map<String, Value>>,
) -> Result<(CookieJar, Json<Value>), AppError> {
    let email = payload
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_string);

    let token = state.issuer.issue(payload)?;
    record_token_issued();

    tracing::info!(
        email = email.as_deref().unwrap_or("-"),
        ttl_seconds = state.issuer.ttl_seconds(),
        "Issued session token"
    );

    let jar = jar.add(state.cookies.session_cookie(token));
    Ok((jar, Json(json!({ "success": true }))))
}

/// Clears the `token` cookie.
///
/// The token is not revoked: a copy replayed by another client keeps working
/// until it expires.
#[tracing::instrument(skip(state, jar))]
pub async fn revoke_token(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    tracing::info!("Clearing session cookie");
    let jar = jar.add(state.cookies.removal_cookie());
    (jar, Json(json!({ "success": true })))
}
