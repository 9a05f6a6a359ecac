//! In-memory policy document store for sales projections.

mod store;

pub use store::PolicyDocumentStore;
