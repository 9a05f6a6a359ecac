use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use log::{debug, info};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::policies_model::*;
use super::policies_traits::{OfferRepositoryTrait, PolicyRepositoryTrait, PolicyServiceTrait};
use crate::constants::OFFER_VALIDITY_DAYS;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEventSink, IntegrationEvent, PolicyCreated, PolicyTerminated};
use crate::pricing::{CoverPrice, PricingParams, PricingServiceTrait};
use crate::products::{Product, ProductServiceTrait};
use crate::utils::money::round_money;
use crate::utils::time_utils::{self, days_between};

/// Service for offers and policies.
pub struct PolicyService {
    offers: Arc<dyn OfferRepositoryTrait>,
    policies: Arc<dyn PolicyRepositoryTrait>,
    products: Arc<dyn ProductServiceTrait>,
    pricing: Arc<dyn PricingServiceTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    today: fn() -> NaiveDate,
}

impl PolicyService {
    pub fn new(
        offers: Arc<dyn OfferRepositoryTrait>,
        policies: Arc<dyn PolicyRepositoryTrait>,
        products: Arc<dyn ProductServiceTrait>,
        pricing: Arc<dyn PricingServiceTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            offers,
            policies,
            products,
            pricing,
            event_sink,
            today: time_utils::today,
        }
    }

    /// Overrides the business date source.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Checks covers and answers against the catalog and returns the product.
    fn validate_offer_request(&self, command: &CreateOffer) -> Result<Product> {
        let product = self.products.get_product(&command.product_code)?;

        for cover in &command.selected_covers {
            if product.find_cover(cover).is_none() {
                return Err(ValidationError::InvalidInput(format!(
                    "Product {} has no cover {}",
                    product.code, cover
                ))
                .into());
            }
        }

        for answer in &command.answers {
            let known = product
                .questions
                .iter()
                .any(|q| q.code.eq_ignore_ascii_case(&answer.question_code));
            if !known {
                return Err(ValidationError::InvalidInput(format!(
                    "Product {} has no question {}",
                    product.code, answer.question_code
                ))
                .into());
            }
        }
        Ok(product)
    }

    fn load_policy(&self, number: &str) -> Result<Policy> {
        self.policies
            .find_by_number(number)?
            .ok_or_else(|| Error::not_found("Policy", number))
    }
}

#[async_trait]
impl PolicyServiceTrait for PolicyService {
    async fn create_offer(&self, command: CreateOffer, agent_login: &str) -> Result<Offer> {
        let product = self.validate_offer_request(&command)?;

        let calculation = self
            .pricing
            .calculate_price(PricingParams {
                product_code: product.code.clone(),
                policy_from: command.policy_from,
                policy_to: command.policy_to,
                selected_covers: command.selected_covers.clone(),
                answers: command.answers.clone(),
            })
            .await?;

        let today = (self.today)();
        let offer = Offer {
            number: Uuid::new_v4().to_string(),
            product_code: product.code,
            policy_from: command.policy_from,
            policy_to: command.policy_to,
            status: OfferStatus::New,
            covers: calculation.cover_prices,
            answers: command.answers,
            total_premium: calculation.total_premium,
            creation_date: today,
            valid_to: today + Duration::days(OFFER_VALIDITY_DAYS),
            agent_login: agent_login.to_string(),
        };
        debug!(
            "Created offer {} for product {} with premium {}",
            offer.number, offer.product_code, offer.total_premium
        );
        self.offers.insert(offer).await
    }

    fn get_offer(&self, number: &str) -> Result<Offer> {
        self.offers
            .find_by_number(number)?
            .ok_or_else(|| Error::not_found("Offer", number))
    }

    async fn create_policy(
        &self,
        command: CreatePolicy,
        agent_login: &str,
    ) -> Result<PolicyDetails> {
        validate_holder(&command.policy_holder)?;

        let mut offer = self.get_offer(&command.offer_number)?;
        if offer.status != OfferStatus::New {
            return Err(Error::ConstraintViolation(format!(
                "Offer {} has already been {:?}",
                offer.number, offer.status
            )));
        }
        let today = (self.today)();
        if offer.is_expired(today) {
            return Err(Error::ConstraintViolation(format!(
                "Offer {} expired on {}",
                offer.number, offer.valid_to
            )));
        }

        let policy = Policy {
            number: Uuid::new_v4().to_string(),
            offer_number: offer.number.clone(),
            product_code: offer.product_code.clone(),
            agent_login: agent_login.to_string(),
            creation_date: today,
            versions: vec![PolicyVersion {
                version_number: 1,
                policy_holder: command.policy_holder,
                address: command.address,
                cover_from: offer.policy_from,
                cover_to: offer.policy_to,
                covers: offer.covers.clone(),
                total_premium: offer.total_premium,
                status: PolicyStatus::Active,
            }],
        };

        offer.status = OfferStatus::Converted;
        self.offers.update(offer, OfferStatus::New).await?;
        let policy = self.policies.insert(policy).await?;
        let details = to_details(&policy)?;

        info!(
            "Policy {} created from offer {} by {}",
            policy.number, policy.offer_number, policy.agent_login
        );
        self.event_sink
            .emit(IntegrationEvent::PolicyCreated(PolicyCreated {
                policy_number: details.number.clone(),
                product_code: details.product_code.clone(),
                policy_from: details.cover_from,
                policy_to: details.cover_to,
                policy_holder: details.policy_holder.clone(),
                total_premium: details.total_premium,
                agent_login: details.agent_login.clone(),
            }));

        Ok(details)
    }

    fn get_policy(&self, number: &str) -> Result<PolicyDetails> {
        to_details(&self.load_policy(number)?)
    }

    async fn terminate_policy(
        &self,
        number: &str,
        command: TerminatePolicy,
    ) -> Result<TerminationResult> {
        let mut policy = self.load_policy(number)?;
        let (original_from, original_to) = match policy.first_version() {
            Some(v) => (v.cover_from, v.cover_to),
            None => return Err(missing_version(number)),
        };
        let current = policy
            .current_version()
            .cloned()
            .ok_or_else(|| missing_version(number))?;

        if current.status == PolicyStatus::Terminated {
            return Err(Error::ConstraintViolation(format!(
                "Policy {} is already terminated",
                number
            )));
        }
        let termination_date = command.termination_date;
        if termination_date < current.cover_from || termination_date > current.cover_to {
            return Err(ValidationError::InvalidDateRange(format!(
                "Termination date {} is outside cover period {} - {}",
                termination_date, current.cover_from, current.cover_to
            ))
            .into());
        }

        let covers = prorate(&current, termination_date);
        let total_premium: Decimal = covers.iter().map(|c| c.price).sum();
        let amount_to_return = current.total_premium - total_premium;

        let expected_version = current.version_number;
        policy.versions.push(PolicyVersion {
            version_number: expected_version + 1,
            cover_to: termination_date,
            covers,
            total_premium,
            status: PolicyStatus::Terminated,
            ..current
        });
        let policy = self.policies.update(policy, expected_version).await?;

        info!(
            "Policy {} terminated on {}, amount to return {}",
            policy.number, termination_date, amount_to_return
        );
        self.event_sink
            .emit(IntegrationEvent::PolicyTerminated(PolicyTerminated {
                policy_number: policy.number.clone(),
                product_code: policy.product_code.clone(),
                policy_from: original_from,
                policy_to: original_to,
                termination_date,
                amount_to_return,
                agent_login: policy.agent_login.clone(),
            }));

        Ok(TerminationResult {
            policy_number: policy.number,
            termination_date,
            amount_to_return,
        })
    }
}

fn validate_holder(holder: &PolicyHolder) -> Result<()> {
    if holder.first_name.trim().is_empty() {
        return Err(ValidationError::MissingField("policyHolder.firstName".to_string()).into());
    }
    if holder.last_name.trim().is_empty() {
        return Err(ValidationError::MissingField("policyHolder.lastName".to_string()).into());
    }
    Ok(())
}

/// Cover prices for the days actually used up to `termination_date`.
fn prorate(version: &PolicyVersion, termination_date: NaiveDate) -> Vec<CoverPrice> {
    let total_days = days_between(version.cover_from, version.cover_to);
    let used_days = days_between(version.cover_from, termination_date);
    version
        .covers
        .iter()
        .map(|cover| {
            let price = if total_days <= 0 {
                Decimal::ZERO
            } else {
                round_money(cover.price * Decimal::from(used_days) / Decimal::from(total_days))
            };
            CoverPrice {
                cover_code: cover.cover_code.clone(),
                price,
            }
        })
        .collect()
}

fn missing_version(number: &str) -> Error {
    Error::Unexpected(format!("Policy {} has no versions", number))
}

fn to_details(policy: &Policy) -> Result<PolicyDetails> {
    let version = policy
        .current_version()
        .ok_or_else(|| missing_version(&policy.number))?;
    Ok(PolicyDetails {
        number: policy.number.clone(),
        product_code: policy.product_code.clone(),
        version_number: version.version_number,
        cover_from: version.cover_from,
        cover_to: version.cover_to,
        policy_holder: version.policy_holder.clone(),
        address: version.address.clone(),
        covers: version.covers.clone(),
        total_premium: version.total_premium,
        status: version.status,
        agent_login: policy.agent_login.clone(),
    })
}
