//! # Coffee Shop SDK
//!
//! Typed client for the Coffee Shop drinks API, configured from the shared
//! [`Environment`](coffee_shop_common::Environment) record.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{AuthSession, TokenStore};
pub use client::{ClientBuilder, CoffeeShopClient};
pub use error::{Result, SdkError};

// Shared types callers need to build requests
pub use coffee_shop_common::types::{Drink, DrinkPayload, DrinkShort, RecipePart};
pub use coffee_shop_common::{permissions, Environment};
