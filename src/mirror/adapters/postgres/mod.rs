//! `PostgreSQL` persistence adapter for the mirror store.

mod models;
mod repository;
pub mod schema;

pub use repository::{MirrorPgPool, PostgresMirrorStore};
