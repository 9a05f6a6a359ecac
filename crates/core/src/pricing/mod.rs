//! Pricing module - tariffs, premium calculation and the formula interpreter.

mod formula;
mod pricing_model;
mod pricing_service;
mod pricing_traits;

pub use formula::{Bindings, Formula, FormulaError, Value};
pub use pricing_model::{
    BasePremiumRule, CalculationResult, CoverPrice, DiscountMarkupRule, PricingParams,
    QuestionAnswer, Tariff,
};
pub use pricing_service::PricingService;
pub use pricing_traits::{PricingServiceTrait, TariffRepositoryTrait};
