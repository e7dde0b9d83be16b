use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde_json::{Map, Value};
use service_core::error::AppError;

use crate::models::Identity;

/// Name of the cookie that carries the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Signs and verifies session tokens (HS256, fixed lifetime).
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Fails when the secret is empty; callers treat that as fatal at startup.
    pub fn new(secret: &Secret<String>, ttl_seconds: i64) -> Result<Self, AppError> {
        let secret = secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ACCESS_TOKEN_SECRET must not be empty"
            )));
        }
        if ttl_seconds <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "TOKEN_TTL_SECONDS must be positive, got {}",
                ttl_seconds
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_seconds),
        })
    }

    /// Mints a token for an arbitrary login payload, valid from now.
    pub fn issue(&self, payload: Map<String, Value>) -> Result<String, AppError> {
        self.issue_at(payload, Utc::now())
    }

    /// Mints a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        payload: Map<String, Value>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expires_at = issued_at + self.ttl;
        let identity =
            Identity::from_payload(payload, issued_at.timestamp(), expires_at.timestamp());

        encode(&Header::new(Algorithm::HS256), &identity, &self.encoding_key).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to sign session token: {}", e))
        })
    }

    /// Verifies signature and expiry and returns the embedded identity.
    pub fn verify(&self, token: &str) -> Result<Identity, jsonwebtoken::errors::Error> {
        decode::<Identity>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

/// Attributes of the session cookie for the current deployment.
///
/// Production serves the API cross-site, which browsers only allow for
/// `SameSite=None` cookies that are also `Secure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookiePolicy {
    pub fn for_production(production: bool) -> Self {
        if production {
            Self {
                secure: true,
                same_site: SameSite::None,
            }
        } else {
            Self {
                secure: false,
                same_site: SameSite::Strict,
            }
        }
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .build()
    }

    /// An already-expired `token` cookie with the same attributes.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}
