//! # Coffee Shop API
//!
//! HTTP server for the Coffee Shop drinks menu.
//!
//! ## Features
//!
//! - **Drinks menu**: public listing plus create, update and delete for staff
//! - **Authentication**: Auth0 RS256 access tokens validated against the tenant JWKS
//! - **Authorization**: per-route RBAC permissions from the token's `permissions` claim
//! - **Storage**: SQLite through sqlx
//! - **OpenAPI Documentation**: Auto-generated API documentation

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Result};
pub use server::{AppState, Server};

/// Version of the coffee-shop-api crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
