use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use log::debug;
use rust_decimal::Decimal;

use super::formula::{Bindings, Formula, Value};
use super::pricing_model::{CalculationResult, CoverPrice, PricingParams, Tariff};
use super::pricing_traits::{PricingServiceTrait, TariffRepositoryTrait};
use crate::constants::{FORMULA_VAR_DAYS, FORMULA_VAR_POLICY_FROM_MONTH};
use crate::errors::{Error, Result, ValidationError};
use crate::utils::money::round_money;
use crate::utils::time_utils::days_between;

/// Calculates premiums from the tariff rules of a product.
pub struct PricingService {
    tariffs: Arc<dyn TariffRepositoryTrait>,
}

impl PricingService {
    pub fn new(tariffs: Arc<dyn TariffRepositoryTrait>) -> Self {
        Self { tariffs }
    }

    pub fn calculate(&self, params: &PricingParams) -> Result<CalculationResult> {
        validate(params)?;
        let tariff = self
            .tariffs
            .find_by_code(&params.product_code)?
            .ok_or_else(|| Error::not_found("Tariff", params.product_code.clone()))?;

        let bindings = bindings_for(params);
        let mut cover_prices = Vec::with_capacity(params.selected_covers.len());
        for cover_code in unique_covers(&params.selected_covers) {
            let price = base_price(&tariff, &cover_code, &bindings)?;
            cover_prices.push(CoverPrice {
                cover_code,
                price,
            });
        }

        for rule in &tariff.discount_markup_rules {
            if Formula::parse(&rule.apply_if)?.evaluate_bool(&bindings)? {
                debug!(
                    "Applying discount/markup {} to tariff {}",
                    rule.param_value, tariff.code
                );
                let factor = Decimal::ONE + rule.param_value;
                for cover in cover_prices.iter_mut() {
                    cover.price *= factor;
                }
            }
        }

        for cover in cover_prices.iter_mut() {
            cover.price = round_money(cover.price);
        }
        let total_premium = cover_prices.iter().map(|c| c.price).sum();

        Ok(CalculationResult {
            total_premium,
            cover_prices,
        })
    }
}

#[async_trait]
impl PricingServiceTrait for PricingService {
    async fn calculate_price(&self, params: PricingParams) -> Result<CalculationResult> {
        self.calculate(&params)
    }
}

fn validate(params: &PricingParams) -> Result<()> {
    if params.product_code.trim().is_empty() {
        return Err(ValidationError::MissingField("productCode".to_string()).into());
    }
    if params.selected_covers.is_empty() {
        return Err(ValidationError::MissingField("selectedCovers".to_string()).into());
    }
    if params.policy_to <= params.policy_from {
        return Err(ValidationError::InvalidDateRange(format!(
            "policyTo {} must be after policyFrom {}",
            params.policy_to, params.policy_from
        ))
        .into());
    }
    Ok(())
}

fn unique_covers(selected: &[String]) -> Vec<String> {
    let mut covers: Vec<String> = Vec::with_capacity(selected.len());
    for code in selected {
        if !covers.iter().any(|c| c.eq_ignore_ascii_case(code)) {
            covers.push(code.clone());
        }
    }
    covers
}

fn bindings_for(params: &PricingParams) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.set(
        FORMULA_VAR_DAYS,
        Value::Number(Decimal::from(days_between(
            params.policy_from,
            params.policy_to,
        ))),
    );
    bindings.set(
        FORMULA_VAR_POLICY_FROM_MONTH,
        Value::Number(Decimal::from(params.policy_from.month())),
    );
    for answer in &params.answers {
        bindings.set(&answer.question_code, answer.answer.clone());
    }
    bindings
}

fn base_price(tariff: &Tariff, cover_code: &str, bindings: &Bindings) -> Result<Decimal> {
    for rule in tariff
        .base_premium_rules
        .iter()
        .filter(|r| r.cover_code.eq_ignore_ascii_case(cover_code))
    {
        let applies = match &rule.apply_if {
            Some(condition) => Formula::parse(condition)?.evaluate_bool(bindings)?,
            None => true,
        };
        if applies {
            return Ok(Formula::parse(&rule.base_price)?.evaluate_number(bindings)?);
        }
    }
    Err(ValidationError::InvalidInput(format!(
        "No premium rule of tariff {} applies to cover {}",
        tariff.code, cover_code
    ))
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{BasePremiumRule, DiscountMarkupRule, QuestionAnswer};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    struct Tariffs(Vec<Tariff>);

    impl TariffRepositoryTrait for Tariffs {
        fn find_by_code(&self, code: &str) -> Result<Option<Tariff>> {
            Ok(self.0.iter().find(|t| t.code == code).cloned())
        }

        fn get_all(&self) -> Result<Vec<Tariff>> {
            Ok(self.0.clone())
        }
    }

    fn travel_tariff() -> Tariff {
        Tariff {
            code: "TRI".to_string(),
            base_premium_rules: vec![
                BasePremiumRule::new(
                    "C1",
                    None,
                    "(NUM_OF_ADULTS) * (DESTINATION == \"EUR\" ? 26.00M : 34.00M)",
                ),
                BasePremiumRule::new("C2", Some("DAYS > 7"), "DAYS * 1.50M"),
                BasePremiumRule::new("C2", None, "10.00M"),
                BasePremiumRule::new("C3", Some("NUM_OF_CHILDREN > 0"), "9.99M"),
            ],
            discount_markup_rules: vec![DiscountMarkupRule::new(
                "NUM_OF_ADULTS >= 3",
                dec!(-0.10),
            )],
        }
    }

    fn service() -> PricingService {
        PricingService::new(Arc::new(Tariffs(vec![travel_tariff()])))
    }

    fn params(adults: i64, covers: &[&str], days: i64) -> PricingParams {
        let from = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        PricingParams {
            product_code: "TRI".to_string(),
            policy_from: from,
            policy_to: from + chrono::Duration::days(days),
            selected_covers: covers.iter().map(|c| c.to_string()).collect(),
            answers: vec![
                QuestionAnswer::new("NUM_OF_ADULTS", Value::Number(Decimal::from(adults))),
                QuestionAnswer::new("NUM_OF_CHILDREN", Value::Number(dec!(0))),
                QuestionAnswer::new("DESTINATION", Value::Text("EUR".to_string())),
            ],
        }
    }

    #[test]
    fn first_applicable_rule_prices_each_cover() {
        let result = service().calculate(&params(2, &["C1", "C2"], 10)).unwrap();
        assert_eq!(
            result.cover_prices,
            vec![
                CoverPrice {
                    cover_code: "C1".to_string(),
                    price: dec!(52.00)
                },
                CoverPrice {
                    cover_code: "C2".to_string(),
                    price: dec!(15.00)
                },
            ]
        );
        assert_eq!(result.total_premium, dec!(67.00));
    }

    #[test]
    fn fallback_rule_used_for_short_trips() {
        let result = service().calculate(&params(1, &["C2"], 5)).unwrap();
        assert_eq!(result.total_premium, dec!(10.00));
    }

    #[test]
    fn discount_scales_every_cover() {
        let result = service().calculate(&params(3, &["C1", "C2"], 10)).unwrap();
        // (78 + 15) * 0.9
        assert_eq!(result.cover_prices[0].price, dec!(70.20));
        assert_eq!(result.cover_prices[1].price, dec!(13.50));
        assert_eq!(result.total_premium, dec!(83.70));
    }

    #[test]
    fn cover_without_applicable_rule_is_rejected() {
        let err = service().calculate(&params(1, &["C3"], 5)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn duplicate_covers_are_priced_once() {
        let result = service().calculate(&params(1, &["C1", "c1"], 5)).unwrap();
        assert_eq!(result.cover_prices.len(), 1);
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let mut p = params(1, &["C1"], 5);
        std::mem::swap(&mut p.policy_from, &mut p.policy_to);
        assert!(matches!(
            service().calculate(&p),
            Err(Error::Validation(ValidationError::InvalidDateRange(_)))
        ));
    }

    #[test]
    fn unknown_tariff_is_not_found() {
        let mut p = params(1, &["C1"], 5);
        p.product_code = "HSI".to_string();
        assert!(matches!(
            service().calculate(&p),
            Err(Error::NotFound { entity: "Tariff", .. })
        ));
    }
}
