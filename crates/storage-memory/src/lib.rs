//! In-memory storage implementation for PolicyHub.
//!
//! Implements every repository trait defined in `policyhub-core` on top of
//! lock-guarded maps, and ships the seed catalogs (products and tariffs)
//! the services start with.
//!
//! ```text
//! core (domain traits)
//!        │
//!        ▼
//! storage-memory (this crate)
//!        │
//!        ▼
//!  RwLock<HashMap<..>> / BTreeMap term index
//! ```

pub mod errors;
pub mod seed;
pub mod table;

// Repository implementations
pub mod dashboard;
pub mod payments;
pub mod policies;
pub mod pricing;
pub mod products;
pub mod search;

pub use errors::StorageError;
pub use table::MemoryTable;

// Re-export from policyhub-core for convenience
pub use policyhub_core::errors::{Error, Result};
