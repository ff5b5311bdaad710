// Application layer - read services over the general-ledger tables.
// Account commands validate themselves in the domain layer; this layer
// only turns filters into queries and maps storage failures.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
