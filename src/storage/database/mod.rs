//! Database storage implementation using SeaORM
//!
//! This module provides the SQL-backed record store: entities for the active
//! and completed tables, their migrations, and the `RecordStore` adapter.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM record store module
pub mod store;

pub use store::SeaOrmRecordStore;
