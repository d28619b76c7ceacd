//! Auth0 RBAC permissions for the drinks API
//!
//! These strings match the permissions configured on the Auth0 API and are
//! carried in the `permissions` claim of access tokens.

/// Read the full recipe of every drink
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";

/// Create a drink
pub const POST_DRINKS: &str = "post:drinks";

/// Update a drink
pub const PATCH_DRINKS: &str = "patch:drinks";

/// Delete a drink
pub const DELETE_DRINKS: &str = "delete:drinks";

/// All permissions, in the order a manager role lists them
pub const ALL: [&str; 4] = [GET_DRINKS_DETAIL, POST_DRINKS, PATCH_DRINKS, DELETE_DRINKS];
