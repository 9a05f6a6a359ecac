//! Policy account domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Premium due for the policy, booked as a negative amount.
    ExpectedPayment,
    /// Money received from the customer.
    InPayment,
    /// Premium released by an early termination.
    Termination,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountingEntry {
    pub kind: EntryKind,
    pub amount: Decimal,
    pub effective_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAccount {
    pub policy_number: String,
    pub policy_account_number: String,
    pub status: AccountStatus,
    pub entries: Vec<AccountingEntry>,
}

impl PolicyAccount {
    pub fn new(policy_number: &str, policy_account_number: &str) -> Self {
        Self {
            policy_number: policy_number.to_string(),
            policy_account_number: policy_account_number.to_string(),
            status: AccountStatus::Active,
            entries: Vec::new(),
        }
    }

    pub fn book(&mut self, kind: EntryKind, amount: Decimal, effective_date: NaiveDate) {
        self.entries.push(AccountingEntry {
            kind,
            amount,
            effective_date,
            created_at: Utc::now(),
        });
    }

    /// Positive when the customer paid more than is due.
    pub fn balance(&self) -> Decimal {
        self.entries.iter().map(|e| e.amount).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAccountBalance {
    pub policy_number: String,
    pub policy_account_number: String,
    pub status: AccountStatus,
    pub balance: Decimal,
    pub entries: Vec<AccountingEntry>,
}

impl From<PolicyAccount> for PolicyAccountBalance {
    fn from(account: PolicyAccount) -> Self {
        Self {
            balance: account.balance(),
            policy_number: account.policy_number,
            policy_account_number: account.policy_account_number,
            status: account.status,
            entries: account.entries,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InPayment {
    pub policy_account_number: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankStatementLineError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankStatementImportResult {
    pub imported: usize,
    pub failed: Vec<BankStatementLineError>,
}
