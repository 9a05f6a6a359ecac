//! Products module - insurance product catalog models, services, and traits.

mod products_model;
mod products_service;
mod products_traits;

pub use products_model::{Choice, Cover, Product, Question, QuestionKind};
pub use products_service::ProductService;
pub use products_traits::{ProductRepositoryTrait, ProductServiceTrait};
