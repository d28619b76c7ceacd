//! # Coffee Shop Common
//!
//! Types shared by the Coffee Shop API server and its clients:
//!
//! - **Environment**: the typed front-end environment record (API base URL and
//!   Auth0 tenant parameters)
//! - **Types**: drink and recipe representations exchanged over HTTP
//! - **Permissions**: Auth0 RBAC permission identifiers
//! - **Logging**: unified tracing initialization for binaries

pub mod environment;
pub mod error;
pub mod logging;
pub mod permissions;
pub mod types;

pub use environment::{Auth0Settings, Environment};
pub use error::{ConfigurationError, EnvironmentError};
