use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use policyhub_core::payments::{PolicyAccount, PolicyAccountRepositoryTrait};
use policyhub_core::Result;

use crate::errors::StorageError;
use crate::table::MemoryTable;

/// Policy accounts keyed by policy number, with a secondary index on the
/// bank account number.
pub struct PolicyAccountRepository {
    accounts: MemoryTable<PolicyAccount>,
    by_account_number: RwLock<HashMap<String, String>>,
}

impl PolicyAccountRepository {
    pub fn new() -> Self {
        PolicyAccountRepository {
            accounts: MemoryTable::new("PolicyAccount"),
            by_account_number: RwLock::new(HashMap::new()),
        }
    }

    fn policy_number_for(&self, account_number: &str) -> Result<Option<String>> {
        let index = self
            .by_account_number
            .read()
            .map_err(|_| StorageError::LockPoisoned("PolicyAccount"))?;
        Ok(index.get(account_number).cloned())
    }
}

impl Default for PolicyAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyAccountRepositoryTrait for PolicyAccountRepository {
    fn find_by_policy_number(&self, policy_number: &str) -> Result<Option<PolicyAccount>> {
        self.accounts.get(policy_number)
    }

    fn find_by_account_number(&self, account_number: &str) -> Result<Option<PolicyAccount>> {
        match self.policy_number_for(account_number)? {
            Some(policy_number) => self.accounts.get(&policy_number),
            None => Ok(None),
        }
    }

    fn account_number_exists(&self, account_number: &str) -> Result<bool> {
        Ok(self.policy_number_for(account_number)?.is_some())
    }

    async fn insert(&self, account: PolicyAccount) -> Result<PolicyAccount> {
        let mut index = self
            .by_account_number
            .write()
            .map_err(|_| StorageError::LockPoisoned("PolicyAccount"))?;
        if index.contains_key(&account.policy_account_number) {
            return Err(StorageError::Duplicate {
                entity: "PolicyAccount",
                key: account.policy_account_number.clone(),
            }
            .into());
        }
        let policy_number = account.policy_number.clone();
        let account_number = account.policy_account_number.clone();
        let account = self.accounts.insert(&policy_number, account)?;
        index.insert(account_number, policy_number);
        Ok(account)
    }

    async fn update(&self, account: PolicyAccount) -> Result<PolicyAccount> {
        let key = account.policy_number.clone();
        self.accounts.update(&key, account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn account_is_reachable_by_both_numbers() {
        let repo = PolicyAccountRepository::new();
        repo.insert(PolicyAccount::new("P-1", "0000000001"))
            .await
            .unwrap();

        assert!(repo.account_number_exists("0000000001").unwrap());
        assert_eq!(
            repo.find_by_account_number("0000000001")
                .unwrap()
                .unwrap()
                .policy_number,
            "P-1"
        );
        assert!(repo.find_by_policy_number("P-1").unwrap().is_some());
        assert!(repo.find_by_account_number("9").unwrap().is_none());
    }

    #[tokio::test]
    async fn account_numbers_are_unique() {
        let repo = PolicyAccountRepository::new();
        repo.insert(PolicyAccount::new("P-1", "0000000001"))
            .await
            .unwrap();
        assert!(repo
            .insert(PolicyAccount::new("P-2", "0000000001"))
            .await
            .is_err());
        assert!(repo.find_by_policy_number("P-2").unwrap().is_none());
    }
}
