//! In-memory product catalog.

mod repository;

pub use repository::ProductRepository;
