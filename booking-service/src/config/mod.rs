use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub services: ServicesConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub token_secret: Secret<String>,
    pub token_ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct ServicesConfig {
    /// Whether `PUT /allServices/:id` inserts a document when the id does
    /// not exist yet.
    pub upsert_on_update: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    pub otlp_endpoint: Option<String>,
}

impl BookingConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let environment =
            Environment::from_name(&env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()));
        let is_prod = environment.is_production();

        Ok(BookingConfig {
            common: common_config,
            environment,
            mongodb: MongoConfig {
                uri: Secret::new(get_env(
                    "MONGODB_URI",
                    Some("mongodb://localhost:27017"),
                    is_prod,
                )?),
                database: get_env("MONGODB_DATABASE", Some("allManagementServices"), is_prod)?,
            },
            auth: AuthConfig {
                token_secret: Secret::new(get_env(
                    "ACCESS_TOKEN_SECRET",
                    Some("dev-access-token-secret"),
                    is_prod,
                )?),
                token_ttl_seconds: parse_env("TOKEN_TTL_SECONDS", 3600)?,
            },
            services: ServicesConfig {
                upsert_on_update: parse_env("SERVICES_UPSERT_ON_UPDATE", true)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|raw| split_origins(&raw))
                    .unwrap_or_default(),
            },
            observability: ObservabilityConfig {
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
