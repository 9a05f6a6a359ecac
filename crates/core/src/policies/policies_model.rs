//! Offer and policy domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{CoverPrice, QuestionAnswer};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    New,
    Converted,
    Rejected,
}

/// A priced proposal that can be converted into a policy while valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub number: String,
    pub product_code: String,
    pub policy_from: NaiveDate,
    pub policy_to: NaiveDate,
    pub status: OfferStatus,
    pub covers: Vec<CoverPrice>,
    pub answers: Vec<QuestionAnswer>,
    pub total_premium: Decimal,
    pub creation_date: NaiveDate,
    pub valid_to: NaiveDate,
    pub agent_login: String,
}

impl Offer {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.valid_to
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOffer {
    pub product_code: String,
    pub policy_from: NaiveDate,
    pub policy_to: NaiveDate,
    pub selected_covers: Vec<String>,
    #[serde(default)]
    pub answers: Vec<QuestionAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyHolder {
    pub first_name: String,
    pub last_name: String,
    pub tax_id: String,
}

impl PolicyHolder {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub country: String,
    pub zip_code: String,
    pub city: String,
    pub street: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicy {
    pub offer_number: String,
    pub policy_holder: PolicyHolder,
    pub address: Address,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStatus {
    Active,
    Terminated,
}

/// One state of a policy; every change appends a new version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyVersion {
    pub version_number: u32,
    pub policy_holder: PolicyHolder,
    pub address: Address,
    pub cover_from: NaiveDate,
    pub cover_to: NaiveDate,
    pub covers: Vec<CoverPrice>,
    pub total_premium: Decimal,
    pub status: PolicyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub number: String,
    pub offer_number: String,
    pub product_code: String,
    pub agent_login: String,
    pub creation_date: NaiveDate,
    pub versions: Vec<PolicyVersion>,
}

impl Policy {
    /// The latest version; policies are never stored without one.
    pub fn current_version(&self) -> Option<&PolicyVersion> {
        self.versions.last()
    }

    pub fn first_version(&self) -> Option<&PolicyVersion> {
        self.versions.first()
    }
}

/// Read model returned by policy queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDetails {
    pub number: String,
    pub product_code: String,
    pub version_number: u32,
    pub cover_from: NaiveDate,
    pub cover_to: NaiveDate,
    pub policy_holder: PolicyHolder,
    pub address: Address,
    pub covers: Vec<CoverPrice>,
    pub total_premium: Decimal,
    pub status: PolicyStatus,
    pub agent_login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminatePolicy {
    pub termination_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminationResult {
    pub policy_number: String,
    pub termination_date: NaiveDate,
    pub amount_to_return: Decimal,
}
