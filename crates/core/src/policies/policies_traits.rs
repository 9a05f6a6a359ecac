use async_trait::async_trait;

use crate::errors::Result;
use crate::policies::policies_model::{
    CreateOffer, CreatePolicy, Offer, OfferStatus, Policy, PolicyDetails, TerminatePolicy,
    TerminationResult,
};

/// Trait for offer storage
#[async_trait]
pub trait OfferRepositoryTrait: Send + Sync {
    fn find_by_number(&self, number: &str) -> Result<Option<Offer>>;
    async fn insert(&self, offer: Offer) -> Result<Offer>;
    /// Stores `offer` if the stored offer still has `expected_status`,
    /// otherwise fails with a constraint violation.
    async fn update(&self, offer: Offer, expected_status: OfferStatus) -> Result<Offer>;
}

/// Trait for policy storage
#[async_trait]
pub trait PolicyRepositoryTrait: Send + Sync {
    fn find_by_number(&self, number: &str) -> Result<Option<Policy>>;
    async fn insert(&self, policy: Policy) -> Result<Policy>;
    /// Stores `policy` if the stored policy's latest version is still
    /// `expected_version`, otherwise fails with a constraint violation.
    async fn update(&self, policy: Policy, expected_version: u32) -> Result<Policy>;
}

/// Trait for offer and policy lifecycle operations
#[async_trait]
pub trait PolicyServiceTrait: Send + Sync {
    async fn create_offer(&self, command: CreateOffer, agent_login: &str) -> Result<Offer>;
    fn get_offer(&self, number: &str) -> Result<Offer>;
    async fn create_policy(&self, command: CreatePolicy, agent_login: &str)
        -> Result<PolicyDetails>;
    fn get_policy(&self, number: &str) -> Result<PolicyDetails>;
    async fn terminate_policy(
        &self,
        number: &str,
        command: TerminatePolicy,
    ) -> Result<TerminationResult>;
}
