//! Domain types and pure logic shared by the database and API crates.

pub mod error;
pub mod media;
pub mod tour;
pub mod tour_id;
pub mod types;
