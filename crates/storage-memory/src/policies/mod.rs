//! In-memory offer and policy storage.

mod repository;

pub use repository::{OfferRepository, PolicyRepository};
