//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod session_repo;
pub mod tour_repo;
pub mod user_repo;

pub use session_repo::SessionRepo;
pub use tour_repo::TourRepo;
pub use user_repo::UserRepo;

/// Whether an error is a unique-constraint violation on `constraint`.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error().is_some_and(|db_err| {
        db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
    })
}
