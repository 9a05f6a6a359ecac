//! Payments module - policy accounts fed by policy events and bank statements.

mod bank_statement;
mod payments_model;
mod payments_service;
mod payments_traits;

pub use bank_statement::{parse_bank_statement, BankStatementLine};
pub use payments_model::*;
pub use payments_service::PaymentService;
pub use payments_traits::{PaymentServiceTrait, PolicyAccountRepositoryTrait};
