//! In-memory tariff storage.

mod repository;

pub use repository::TariffRepository;
