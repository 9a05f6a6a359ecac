//! Product catalog domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An insurance product that can be offered to customers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: String,
    pub name: String,
    pub image: String,
    pub description: String,
    pub max_number_of_insured: u32,
    pub covers: Vec<Cover>,
    pub questions: Vec<Question>,
}

impl Product {
    pub fn find_cover(&self, cover_code: &str) -> Option<&Cover> {
        self.covers
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(cover_code))
    }

    pub fn mandatory_covers(&self) -> impl Iterator<Item = &Cover> {
        self.covers.iter().filter(|c| !c.optional)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    pub code: String,
    pub name: String,
    pub description: String,
    pub optional: bool,
    pub sum_insured: Option<Decimal>,
}

/// A question asked when pricing an offer; answers feed tariff formulas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub code: String,
    pub index: u32,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "questionType", rename_all = "camelCase")]
pub enum QuestionKind {
    Choice { choices: Vec<Choice> },
    Numeric,
    Date,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub code: String,
    pub label: String,
}
