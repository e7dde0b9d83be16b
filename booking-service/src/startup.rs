//! Application startup and lifecycle management.

use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::BookingConfig;
use crate::handlers::{self, auth, bookings, services};
use crate::middleware::access_guard;
use crate::services::{CookiePolicy, DocumentStore, MongoStore, TokenIssuer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: BookingConfig,
    pub store: Arc<dyn DocumentStore>,
    pub issuer: TokenIssuer,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(config: BookingConfig, store: Arc<dyn DocumentStore>) -> Result<Self, AppError> {
        let issuer = TokenIssuer::new(&config.auth.token_secret, config.auth.token_ttl_seconds)?;
        let cookies = CookiePolicy::for_production(config.environment.is_production());

        Ok(Self {
            config,
            store,
            issuer,
            cookies,
        })
    }
}

/// Builds the full HTTP router. Email-scoped routes sit behind the access
/// guard; everything else is public.
pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/myService/:email", get(services::my_services))
        .route("/myBooking/:email", get(bookings::my_bookings))
        .route_layer(from_fn_with_state(state.clone(), access_guard));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/jwt", post(auth::issue_token))
        .route("/logOut", post(auth::revoke_token))
        .route(
            "/allServices",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/allServices/:id",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/allBookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/allBookings/:id", patch(bookings::update_booking_status))
        .merge(guarded)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer(&state.config.cors.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connects to MongoDB, verifies the connection and binds the listener.
    pub async fn build(config: BookingConfig) -> Result<Self, AppError> {
        use secrecy::ExposeSecret;

        let store = MongoStore::connect(
            config.mongodb.uri.expose_secret(),
            &config.mongodb.database,
        )
        .await?;

        store.ping().await.map_err(|e| {
            tracing::error!("MongoDB is not reachable: {}", e);
            e
        })?;
        tracing::info!("Pinged MongoDB deployment successfully");

        Self::with_store(config, Arc::new(store)).await
    }

    /// Builds the application around an already-initialised store.
    pub async fn with_store(
        config: BookingConfig,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState::new(config, store)?;

        tracing::info!(
            port,
            environment = ?state.config.environment,
            "Booking service listening"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves until SIGINT/SIGTERM, then closes the store.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let store = self.state.store.clone();
        let router = build_router(self.state);

        let result = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        store.close().await;

        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }
        result
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
