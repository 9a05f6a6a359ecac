//! Catalog the services start with: four products and their tariffs.

mod products;
mod tariffs;

pub use products::products;
pub use tariffs::tariffs;

#[cfg(test)]
mod tests {
    use super::*;
    use policyhub_core::pricing::Formula;

    #[test]
    fn every_tariff_matches_a_product() {
        let products = products();
        for tariff in tariffs() {
            let product = products
                .iter()
                .find(|p| p.code == tariff.code)
                .unwrap_or_else(|| panic!("no product for tariff {}", tariff.code));
            for rule in &tariff.base_premium_rules {
                assert!(
                    product.find_cover(&rule.cover_code).is_some(),
                    "{} has no cover {}",
                    product.code,
                    rule.cover_code
                );
            }
        }
    }

    #[test]
    fn every_formula_parses() {
        for tariff in tariffs() {
            for rule in &tariff.base_premium_rules {
                Formula::parse(&rule.base_price).unwrap();
                if let Some(condition) = &rule.apply_if {
                    Formula::parse(condition).unwrap();
                }
            }
            for rule in &tariff.discount_markup_rules {
                Formula::parse(&rule.apply_if).unwrap();
            }
        }
    }
}
