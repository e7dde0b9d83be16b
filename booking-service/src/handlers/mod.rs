//! HTTP handlers for booking-service.

pub mod auth;
pub mod bookings;
pub mod health;
pub mod services;

pub use health::{health_check, metrics_endpoint, readiness_check, root};
