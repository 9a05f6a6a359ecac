//! In-memory policy account storage.

mod repository;

pub use repository::PolicyAccountRepository;
