//! Ownership check for `/:email`-scoped routes.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use service_core::error::AppError;

use super::auth::AuthUser;
use crate::models::Identity;
use crate::services::record_auth_rejection;

/// Allows the request only when the authenticated email equals `path_email`
/// exactly (no case folding, no trimming).
pub fn authorize(identity: &Identity, path_email: &str) -> Result<(), AppError> {
    if identity.owns(path_email) {
        Ok(())
    } else {
        tracing::info!(
            requested = %path_email,
            "Ownership check failed for email-scoped route"
        );
        record_auth_rejection("forbidden");
        Err(AppError::Forbidden(anyhow::anyhow!("Forbidden")))
    }
}

/// The `:email` path parameter, guaranteed to belong to the caller.
///
/// Requires [`super::access_guard`] on the route.
#[derive(Debug, Clone)]
pub struct OwnerEmail(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OwnerEmail
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;

        let Path(email) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;

        authorize(&identity, &email)?;

        Ok(OwnerEmail(email))
    }
}
