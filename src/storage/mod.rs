pub mod query;
mod repository;

pub use query::{JournalEntryCountQuery, JournalEntryQuery, Predicate, SqlParam};
pub use repository::*;

/// SQL migration for the general-ledger schema
pub const MIGRATION_001_SCHEMA: &str = include_str!("migrations/001_schema.sql");
