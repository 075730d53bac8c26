//! Database abstraction layer
//!
//! Catalog introspection and statement execution behind one trait, with a
//! provider per supported database.

pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use traits::{DatabaseError, DatabaseProvider};
