//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation, validation, and refresh-token helpers.
//! - [`cookie`] -- The HTTP-only cookie carrying the refresh token.
//! - [`bootstrap`] -- Seeding the first admin account from the environment.

pub mod bootstrap;
pub mod cookie;
pub mod jwt;
pub mod password;
