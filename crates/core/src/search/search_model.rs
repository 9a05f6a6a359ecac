use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::policies::PolicyStatus;

/// A policy as stored in the search index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicySearchDocument {
    pub policy_number: String,
    pub product_code: String,
    pub policy_holder_first_name: String,
    pub policy_holder_last_name: String,
    pub agent_login: String,
    pub policy_from: NaiveDate,
    pub policy_to: NaiveDate,
    pub total_premium: Decimal,
    pub status: PolicyStatus,
}

impl PolicySearchDocument {
    /// Every term under which this document can be found.
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = [
            self.policy_number.as_str(),
            self.product_code.as_str(),
            self.policy_holder_first_name.as_str(),
            self.policy_holder_last_name.as_str(),
            self.agent_login.as_str(),
        ]
        .iter()
        .flat_map(|field| tokenize(field))
        .collect();
        terms.sort();
        terms.dedup();
        terms
    }
}

/// Splits `text` into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("  Jan-Maria O'Brien, jimmy.solid "),
            vec!["jan", "maria", "o", "brien", "jimmy", "solid"]
        );
        assert!(tokenize(" -- ").is_empty());
    }
}
