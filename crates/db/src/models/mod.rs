//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the DTOs used to insert it.

pub mod session;
pub mod tour;
pub mod user;
