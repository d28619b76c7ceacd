//! Authentication module for the Coffee Shop SDK
//!
//! - Auth0 implicit-flow login and logout links
//! - Access token capture from the callback fragment and claim inspection
//! - File-backed token storage

pub mod session;
pub mod store;

// Re-export commonly used types and functions
pub use session::{decode_payload, AuthSession, TokenPayload};
pub use store::{get_sdk_data_dir, TokenStore};
