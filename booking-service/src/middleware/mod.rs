pub mod auth;
pub mod ownership;

pub use auth::{access_guard, AuthUser};
pub use ownership::{authorize, OwnerEmail};
