//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller's identity from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Additionally requires the persisted admin flag.

pub mod auth;
pub mod rbac;
