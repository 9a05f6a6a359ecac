//! Full-text policy search built from integration events.

mod search_model;
mod search_service;
mod search_traits;

pub use search_model::*;
pub use search_service::PolicySearchService;
pub use search_traits::{PolicyIndexTrait, PolicySearchServiceTrait};
