//! Configuration loading and management.

mod database;
mod loader;
mod schema;

pub use database::*;
pub use loader::*;
pub use schema::*;
