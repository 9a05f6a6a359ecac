use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use rand::Rng;

use super::bank_statement::parse_bank_statement;
use super::payments_model::*;
use super::payments_traits::{PaymentServiceTrait, PolicyAccountRepositoryTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{IntegrationEvent, IntegrationEventHandler, PolicyCreated, PolicyTerminated};

const ACCOUNT_NUMBER_ATTEMPTS: usize = 16;

/// Keeps one account per policy: premiums due, money received, refunds.
pub struct PaymentService {
    repository: Arc<dyn PolicyAccountRepositoryTrait>,
}

impl PaymentService {
    pub fn new(repository: Arc<dyn PolicyAccountRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn generate_account_number(&self) -> Result<String> {
        let mut rng = rand::thread_rng();
        for _ in 0..ACCOUNT_NUMBER_ATTEMPTS {
            let candidate = format!("{:010}", rng.gen_range(0..10_000_000_000u64));
            if !self.repository.account_number_exists(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(Error::Unexpected(
            "Could not allocate a unique policy account number".to_string(),
        ))
    }

    async fn on_policy_created(&self, event: &PolicyCreated) -> Result<()> {
        if self
            .repository
            .find_by_policy_number(&event.policy_number)?
            .is_some()
        {
            debug!(
                "Policy account for {} already exists, skipping",
                event.policy_number
            );
            return Ok(());
        }

        let account_number = self.generate_account_number()?;
        let mut account = PolicyAccount::new(&event.policy_number, &account_number);
        account.book(
            EntryKind::ExpectedPayment,
            -event.total_premium,
            event.policy_from,
        );
        self.repository.insert(account).await?;
        info!(
            "Opened policy account {} for policy {}",
            account_number, event.policy_number
        );
        Ok(())
    }

    async fn on_policy_terminated(&self, event: &PolicyTerminated) -> Result<()> {
        let mut account = self
            .repository
            .find_by_policy_number(&event.policy_number)?
            .ok_or_else(|| Error::not_found("PolicyAccount", event.policy_number.clone()))?;
        if account.status == AccountStatus::Closed {
            return Ok(());
        }
        account.book(
            EntryKind::Termination,
            event.amount_to_return,
            event.termination_date,
        );
        account.status = AccountStatus::Closed;
        self.repository.update(account).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentServiceTrait for PaymentService {
    fn get_account_balance(&self, policy_number: &str) -> Result<PolicyAccountBalance> {
        self.repository
            .find_by_policy_number(policy_number)?
            .map(PolicyAccountBalance::from)
            .ok_or_else(|| Error::not_found("PolicyAccount", policy_number))
    }

    async fn register_in_payment(&self, payment: InPayment) -> Result<PolicyAccountBalance> {
        if payment.amount <= rust_decimal::Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Payment amount must be positive, got {}",
                payment.amount
            ))
            .into());
        }
        let mut account = self
            .repository
            .find_by_account_number(&payment.policy_account_number)?
            .ok_or_else(|| {
                Error::not_found("PolicyAccount", payment.policy_account_number.clone())
            })?;
        account.book(EntryKind::InPayment, payment.amount, payment.payment_date);
        let account = self.repository.update(account).await?;
        Ok(account.into())
    }

    async fn import_bank_statement(&self, csv: &str) -> Result<BankStatementImportResult> {
        let (lines, mut failed) = parse_bank_statement(csv)?;
        let mut imported = 0;
        for line in lines {
            let payment = InPayment {
                policy_account_number: line.account_number.clone(),
                amount: line.amount,
                payment_date: line.date,
            };
            match self.register_in_payment(payment).await {
                Ok(_) => imported += 1,
                Err(e) => {
                    warn!("Bank statement line {} rejected: {}", line.line, e);
                    failed.push(BankStatementLineError {
                        line: line.line,
                        message: e.to_string(),
                    });
                }
            }
        }
        failed.sort_by_key(|f| f.line);
        info!(
            "Bank statement imported: {} payment(s), {} rejected line(s)",
            imported,
            failed.len()
        );
        Ok(BankStatementImportResult { imported, failed })
    }
}

#[async_trait]
impl IntegrationEventHandler for PaymentService {
    fn name(&self) -> &'static str {
        "payments"
    }

    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        match event {
            IntegrationEvent::PolicyCreated(e) => self.on_policy_created(e).await,
            IntegrationEvent::PolicyTerminated(e) => self.on_policy_terminated(e).await,
        }
    }
}
