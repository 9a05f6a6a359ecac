//! Sales projection models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sold policy as seen by the sales projections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub policy_number: String,
    pub product_code: String,
    pub agent_login: String,
    pub policy_from: NaiveDate,
    pub policy_to: NaiveDate,
    pub total_premium: Decimal,
    pub terminated: bool,
}

impl PolicyDocument {
    /// Sales are attributed to the day cover starts.
    pub fn sales_date(&self) -> NaiveDate {
        self.policy_from
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesFilter {
    pub product_code: Option<String>,
    pub sales_date_from: Option<NaiveDate>,
    pub sales_date_to: Option<NaiveDate>,
}

impl SalesFilter {
    pub fn matches(&self, doc: &PolicyDocument) -> bool {
        if let Some(code) = &self.product_code {
            if !doc.product_code.eq_ignore_ascii_case(code) {
                return false;
            }
        }
        let date = doc.sales_date();
        if self.sales_date_from.is_some_and(|from| date < from) {
            return false;
        }
        if self.sales_date_to.is_some_and(|to| date > to) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesResult {
    pub policies_count: u64,
    pub premium_amount: Decimal,
}

impl SalesResult {
    pub fn add(&mut self, doc: &PolicyDocument) {
        self.policies_count += 1;
        self.premium_amount += doc.total_premium;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_code: String,
    pub sales: SalesResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TotalSales {
    pub per_product: Vec<ProductSales>,
    pub total: SalesResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSales {
    pub agent_login: String,
    pub sales: SalesResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentsSales {
    pub per_agent: Vec<AgentSales>,
    pub total: SalesResult,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesTrendsQuery {
    pub product_code: Option<String>,
    pub sales_date_from: NaiveDate,
    pub sales_date_to: NaiveDate,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSales {
    pub period: String,
    pub period_start: NaiveDate,
    pub sales: SalesResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesTrends {
    pub unit: TimeUnit,
    pub periods: Vec<PeriodSales>,
}
