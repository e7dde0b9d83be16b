//! Access guard for cookie-authenticated routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use service_core::error::AppError;

use crate::models::Identity;
use crate::services::{record_auth_rejection, TOKEN_COOKIE};
use crate::startup::AppState;

/// Rejects requests without a valid `token` cookie and attaches the decoded
/// [`Identity`] to the request extensions otherwise.
///
/// The token is only ever read from the cookie. Every verification failure
/// gets the same response so callers cannot tell an expired token from a
/// forged one.
pub async fn access_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());

    let token = match jar.get(TOKEN_COOKIE).map(|c| c.value()) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => {
            record_auth_rejection("missing_token");
            return Err(AppError::Unauthorized(anyhow::anyhow!("Unauthorized user")));
        }
    };

    let identity = state.issuer.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        record_auth_rejection("invalid_token");
        AppError::Unauthorized(anyhow::anyhow!("Unauthorized access"))
    })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Extractor for the identity attached by [`access_guard`].
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Without the guard in front there is no identity; refuse rather than
        // treat the request as anonymous.
        let identity = parts.extensions.get::<Identity>().ok_or_else(|| {
            tracing::error!("Identity missing from request extensions; access guard not applied");
            AppError::Unauthorized(anyhow::anyhow!("Unauthorized user"))
        })?;

        Ok(AuthUser(identity.clone()))
    }
}
