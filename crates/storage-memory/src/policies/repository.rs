use async_trait::async_trait;
use policyhub_core::policies::{
    Offer, OfferRepositoryTrait, OfferStatus, Policy, PolicyRepositoryTrait,
};
use policyhub_core::Result;

use crate::table::MemoryTable;

pub struct OfferRepository {
    offers: MemoryTable<Offer>,
}

impl OfferRepository {
    pub fn new() -> Self {
        OfferRepository {
            offers: MemoryTable::new("Offer"),
        }
    }
}

impl Default for OfferRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfferRepositoryTrait for OfferRepository {
    fn find_by_number(&self, number: &str) -> Result<Option<Offer>> {
        self.offers.get(number)
    }

    async fn insert(&self, offer: Offer) -> Result<Offer> {
        let key = offer.number.clone();
        self.offers.insert(&key, offer)
    }

    async fn update(&self, offer: Offer, expected_status: OfferStatus) -> Result<Offer> {
        let key = offer.number.clone();
        self.offers
            .update_if(&key, offer, |stored| stored.status == expected_status)
    }
}

pub struct PolicyRepository {
    policies: MemoryTable<Policy>,
}

impl PolicyRepository {
    pub fn new() -> Self {
        PolicyRepository {
            policies: MemoryTable::new("Policy"),
        }
    }
}

impl Default for PolicyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyRepositoryTrait for PolicyRepository {
    fn find_by_number(&self, number: &str) -> Result<Option<Policy>> {
        self.policies.get(number)
    }

    async fn insert(&self, policy: Policy) -> Result<Policy> {
        let key = policy.number.clone();
        self.policies.insert(&key, policy)
    }

    async fn update(&self, policy: Policy, expected_version: u32) -> Result<Policy> {
        let key = policy.number.clone();
        self.policies.update_if(&key, policy, |stored| {
            stored.current_version().map(|v| v.version_number) == Some(expected_version)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use policyhub_core::policies::{Address, PolicyHolder, PolicyStatus, PolicyVersion};
    use policyhub_core::Error;
    use rust_decimal_macros::dec;

    fn offer(number: &str) -> Offer {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Offer {
            number: number.to_string(),
            product_code: "TRI".to_string(),
            policy_from: day,
            policy_to: day,
            status: OfferStatus::New,
            covers: vec![],
            answers: vec![],
            total_premium: dec!(10),
            creation_date: day,
            valid_to: day,
            agent_login: "jimmy.solid".to_string(),
        }
    }

    #[tokio::test]
    async fn offer_update_requires_existing_row() {
        let repo = OfferRepository::new();
        assert!(matches!(
            repo.update(offer("O-1"), OfferStatus::New).await,
            Err(Error::NotFound { entity: "Offer", .. })
        ));

        repo.insert(offer("O-1")).await.unwrap();
        let mut converted = offer("O-1");
        converted.status = OfferStatus::Converted;
        repo.update(converted, OfferStatus::New).await.unwrap();
        assert_eq!(
            repo.find_by_number("O-1").unwrap().unwrap().status,
            OfferStatus::Converted
        );
    }

    #[tokio::test]
    async fn offer_is_converted_only_once() {
        let repo = OfferRepository::new();
        repo.insert(offer("O-1")).await.unwrap();

        // Both buyers read the offer while it was still new.
        let mut first = repo.find_by_number("O-1").unwrap().unwrap();
        let mut second = first.clone();
        first.status = OfferStatus::Converted;
        second.status = OfferStatus::Converted;

        repo.update(first, OfferStatus::New).await.unwrap();
        assert!(matches!(
            repo.update(second, OfferStatus::New).await,
            Err(Error::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn policy_update_requires_expected_version() {
        let repo = PolicyRepository::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let version = PolicyVersion {
            version_number: 1,
            policy_holder: PolicyHolder {
                first_name: "Anna".to_string(),
                last_name: "Nowak".to_string(),
                tax_id: "12345678901".to_string(),
            },
            address: Address {
                country: "PL".to_string(),
                zip_code: "00-001".to_string(),
                city: "Warsaw".to_string(),
                street: "Chmielna 1".to_string(),
            },
            cover_from: day,
            cover_to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            covers: vec![],
            total_premium: dec!(100),
            status: PolicyStatus::Active,
        };
        let policy = Policy {
            number: "P-1".to_string(),
            offer_number: "O-1".to_string(),
            product_code: "TRI".to_string(),
            agent_login: "jimmy.solid".to_string(),
            creation_date: day,
            versions: vec![version.clone()],
        };
        repo.insert(policy.clone()).await.unwrap();

        let terminated = |premium| {
            let mut next = policy.clone();
            next.versions.push(PolicyVersion {
                version_number: 2,
                total_premium: premium,
                status: PolicyStatus::Terminated,
                ..version.clone()
            });
            next
        };
        repo.update(terminated(dec!(50)), 1).await.unwrap();
        assert!(matches!(
            repo.update(terminated(dec!(40)), 1).await,
            Err(Error::ConstraintViolation(_))
        ));

        let stored = repo.find_by_number("P-1").unwrap().unwrap();
        assert_eq!(stored.versions.len(), 2);
        assert_eq!(stored.versions[1].total_premium, dec!(50));
    }
}
