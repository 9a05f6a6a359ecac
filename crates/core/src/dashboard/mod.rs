//! Dashboard module - sales projections built from policy events.

mod dashboard_model;
mod dashboard_service;
mod dashboard_traits;

pub use dashboard_model::*;
pub use dashboard_service::DashboardService;
pub use dashboard_traits::{DashboardServiceTrait, PolicyDocumentStoreTrait};
