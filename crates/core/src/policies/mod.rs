//! Policies module - offers, policies, and their lifecycle.

mod policies_model;
mod policies_service;
mod policies_traits;

#[cfg(test)]
mod policies_service_tests;

pub use policies_model::*;
pub use policies_service::PolicyService;
pub use policies_traits::{OfferRepositoryTrait, PolicyRepositoryTrait, PolicyServiceTrait};
