//! Pricing domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::formula::Value;

/// Premium rules for one product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tariff {
    pub code: String,
    pub base_premium_rules: Vec<BasePremiumRule>,
    pub discount_markup_rules: Vec<DiscountMarkupRule>,
}

/// Price of a cover, used when `apply_if` is absent or evaluates to true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasePremiumRule {
    pub cover_code: String,
    pub apply_if: Option<String>,
    pub base_price: String,
}

impl BasePremiumRule {
    pub fn new(cover_code: &str, apply_if: Option<&str>, base_price: &str) -> Self {
        Self {
            cover_code: cover_code.to_string(),
            apply_if: apply_if.map(str::to_string),
            base_price: base_price.to_string(),
        }
    }
}

/// Scales every cover price by `1 + param_value` when `apply_if` holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscountMarkupRule {
    pub apply_if: String,
    pub param_value: Decimal,
}

impl DiscountMarkupRule {
    pub fn new(apply_if: &str, param_value: Decimal) -> Self {
        Self {
            apply_if: apply_if.to_string(),
            param_value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    pub question_code: String,
    pub answer: Value,
}

impl QuestionAnswer {
    pub fn new(question_code: &str, answer: Value) -> Self {
        Self {
            question_code: question_code.to_string(),
            answer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingParams {
    pub product_code: String,
    pub policy_from: NaiveDate,
    pub policy_to: NaiveDate,
    pub selected_covers: Vec<String>,
    #[serde(default)]
    pub answers: Vec<QuestionAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverPrice {
    pub cover_code: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub total_premium: Decimal,
    pub cover_prices: Vec<CoverPrice>,
}
