//! PolicyHub Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic of the insurance quoting services.
//! It is storage-agnostic and defines repository traits that are implemented
//! by the `storage-memory` crate. Integration events emitted here are carried
//! between processes by the `messaging` crate.

pub mod chat;
pub mod constants;
pub mod dashboard;
pub mod errors;
pub mod events;
pub mod payments;
pub mod policies;
pub mod pricing;
pub mod products;
pub mod search;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
