pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod integration;
mod main_lib;
pub mod pricing_client;

pub use main_lib::{build_state, init_tracing, AppState};
