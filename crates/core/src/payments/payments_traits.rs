use async_trait::async_trait;

use crate::errors::Result;
use crate::payments::payments_model::{
    BankStatementImportResult, InPayment, PolicyAccount, PolicyAccountBalance,
};

/// Trait for policy account storage
#[async_trait]
pub trait PolicyAccountRepositoryTrait: Send + Sync {
    fn find_by_policy_number(&self, policy_number: &str) -> Result<Option<PolicyAccount>>;
    fn find_by_account_number(&self, account_number: &str) -> Result<Option<PolicyAccount>>;
    fn account_number_exists(&self, account_number: &str) -> Result<bool>;
    async fn insert(&self, account: PolicyAccount) -> Result<PolicyAccount>;
    async fn update(&self, account: PolicyAccount) -> Result<PolicyAccount>;
}

/// Trait for payment operations exposed over HTTP
#[async_trait]
pub trait PaymentServiceTrait: Send + Sync {
    fn get_account_balance(&self, policy_number: &str) -> Result<PolicyAccountBalance>;
    async fn register_in_payment(&self, payment: InPayment) -> Result<PolicyAccountBalance>;
    async fn import_bank_statement(&self, csv: &str) -> Result<BankStatementImportResult>;
}
