use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::errors::{Error, Result, ValidationError};
use crate::events::{IntegrationEvent, MockDomainEventSink};
use crate::policies::*;
use crate::pricing::{
    CalculationResult, CoverPrice, PricingParams, PricingServiceTrait, QuestionAnswer, Value,
};
use crate::products::{Cover, Product, ProductServiceTrait, Question, QuestionKind};

// --- Mock repositories ---
#[derive(Default)]
struct MockOffers {
    offers: Mutex<HashMap<String, Offer>>,
}

#[async_trait]
impl OfferRepositoryTrait for MockOffers {
    fn find_by_number(&self, number: &str) -> Result<Option<Offer>> {
        Ok(self.offers.lock().unwrap().get(number).cloned())
    }

    async fn insert(&self, offer: Offer) -> Result<Offer> {
        self.offers
            .lock()
            .unwrap()
            .insert(offer.number.clone(), offer.clone());
        Ok(offer)
    }

    async fn update(&self, offer: Offer, expected_status: OfferStatus) -> Result<Offer> {
        let mut offers = self.offers.lock().unwrap();
        let stored_status = offers.get(&offer.number).map(|o| o.status);
        match stored_status {
            Some(status) if status == expected_status => {
                offers.insert(offer.number.clone(), offer.clone());
                Ok(offer)
            }
            Some(_) => Err(Error::ConstraintViolation(offer.number)),
            None => Err(Error::not_found("Offer", &offer.number)),
        }
    }
}

#[derive(Default)]
struct MockPolicies {
    policies: Mutex<HashMap<String, Policy>>,
}

#[async_trait]
impl PolicyRepositoryTrait for MockPolicies {
    fn find_by_number(&self, number: &str) -> Result<Option<Policy>> {
        Ok(self.policies.lock().unwrap().get(number).cloned())
    }

    async fn insert(&self, policy: Policy) -> Result<Policy> {
        self.policies
            .lock()
            .unwrap()
            .insert(policy.number.clone(), policy.clone());
        Ok(policy)
    }

    async fn update(&self, policy: Policy, expected_version: u32) -> Result<Policy> {
        let mut policies = self.policies.lock().unwrap();
        let stored_version = policies
            .get(&policy.number)
            .and_then(|p| p.current_version())
            .map(|v| v.version_number);
        if stored_version != Some(expected_version) {
            return Err(Error::ConstraintViolation(policy.number));
        }
        policies.insert(policy.number.clone(), policy.clone());
        Ok(policy)
    }
}

// --- Mock catalog and pricing ---
struct MockProducts;

impl ProductServiceTrait for MockProducts {
    fn get_all_products(&self) -> Result<Vec<Product>> {
        Ok(vec![house()])
    }

    fn get_product(&self, code: &str) -> Result<Product> {
        if code.eq_ignore_ascii_case("HSI") {
            Ok(house())
        } else {
            Err(Error::not_found("Product", code))
        }
    }
}

fn house() -> Product {
    let cover = |code: &str| Cover {
        code: code.to_string(),
        name: code.to_string(),
        description: String::new(),
        optional: false,
        sum_insured: None,
    };
    Product {
        code: "HSI".to_string(),
        name: "Happy House".to_string(),
        image: String::new(),
        description: String::new(),
        max_number_of_insured: 1,
        covers: vec![cover("C1"), cover("C2")],
        questions: vec![Question {
            code: "AREA".to_string(),
            index: 1,
            text: "Area".to_string(),
            kind: QuestionKind::Numeric,
        }],
    }
}

/// Prices C1 at 200 and C2 at 165.
struct FixedPricing;

#[async_trait]
impl PricingServiceTrait for FixedPricing {
    async fn calculate_price(&self, params: PricingParams) -> Result<CalculationResult> {
        let cover_prices: Vec<CoverPrice> = params
            .selected_covers
            .iter()
            .map(|c| CoverPrice {
                cover_code: c.clone(),
                price: if c == "C1" { dec!(200) } else { dec!(165) },
            })
            .collect();
        Ok(CalculationResult {
            total_premium: cover_prices.iter().map(|c| c.price).sum(),
            cover_prices,
        })
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixed_today() -> NaiveDate {
    date(2024, 1, 1)
}

struct Fixture {
    service: PolicyService,
    offers: Arc<MockOffers>,
    sink: MockDomainEventSink,
}

fn fixture() -> Fixture {
    let offers = Arc::new(MockOffers::default());
    let sink = MockDomainEventSink::new();
    let service = PolicyService::new(
        offers.clone(),
        Arc::new(MockPolicies::default()),
        Arc::new(MockProducts),
        Arc::new(FixedPricing),
        Arc::new(sink.clone()),
    )
    .with_clock(fixed_today);
    Fixture {
        service,
        offers,
        sink,
    }
}

fn offer_request() -> CreateOffer {
    CreateOffer {
        product_code: "HSI".to_string(),
        policy_from: date(2024, 1, 1),
        policy_to: date(2024, 12, 31),
        selected_covers: vec!["C1".to_string(), "C2".to_string()],
        answers: vec![QuestionAnswer::new("AREA", Value::Number(dec!(120)))],
    }
}

fn policy_request(offer_number: &str) -> CreatePolicy {
    CreatePolicy {
        offer_number: offer_number.to_string(),
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
    }
}

#[tokio::test]
async fn offer_is_priced_and_valid_for_thirty_days() {
    let f = fixture();
    let offer = f
        .service
        .create_offer(offer_request(), "jimmy.solid")
        .await
        .unwrap();

    assert_eq!(offer.total_premium, dec!(365));
    assert_eq!(offer.status, OfferStatus::New);
    assert_eq!(offer.valid_to, date(2024, 1, 31));
    assert_eq!(offer.agent_login, "jimmy.solid");
    assert_eq!(f.service.get_offer(&offer.number).unwrap(), offer);
}

#[tokio::test]
async fn offer_and_policy_carry_catalog_product_code() {
    let f = fixture();
    let mut request = offer_request();
    request.product_code = "hsi".to_string();

    let offer = f
        .service
        .create_offer(request, "jimmy.solid")
        .await
        .unwrap();
    assert_eq!(offer.product_code, "HSI");

    let policy = f
        .service
        .create_policy(policy_request(&offer.number), "jimmy.solid")
        .await
        .unwrap();
    assert_eq!(policy.product_code, "HSI");
    assert!(matches!(
        f.sink.events().first(),
        Some(IntegrationEvent::PolicyCreated(e)) if e.product_code == "HSI"
    ));
}

#[tokio::test]
async fn offer_with_unknown_cover_is_rejected() {
    let f = fixture();
    let mut request = offer_request();
    request.selected_covers.push("C9".to_string());

    let err = f
        .service
        .create_offer(request, "jimmy.solid")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn buying_an_offer_creates_policy_and_emits_event() {
    let f = fixture();
    let offer = f
        .service
        .create_offer(offer_request(), "jimmy.solid")
        .await
        .unwrap();

    let policy = f
        .service
        .create_policy(policy_request(&offer.number), "jimmy.solid")
        .await
        .unwrap();

    assert_eq!(policy.version_number, 1);
    assert_eq!(policy.status, PolicyStatus::Active);
    assert_eq!(policy.total_premium, dec!(365));
    assert_eq!(
        f.service.get_offer(&offer.number).unwrap().status,
        OfferStatus::Converted
    );

    let events = f.sink.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        IntegrationEvent::PolicyCreated(e) => {
            assert_eq!(e.policy_number, policy.number);
            assert_eq!(e.policy_holder.last_name, "Nowak");
            assert_eq!(e.total_premium, dec!(365));
        }
        other => panic!("Expected PolicyCreated, got {:?}", other),
    }
}

#[tokio::test]
async fn offer_cannot_be_bought_twice() {
    let f = fixture();
    let offer = f
        .service
        .create_offer(offer_request(), "jimmy.solid")
        .await
        .unwrap();
    f.service
        .create_policy(policy_request(&offer.number), "jimmy.solid")
        .await
        .unwrap();

    let err = f
        .service
        .create_policy(policy_request(&offer.number), "jimmy.solid")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
    assert_eq!(f.sink.len(), 1);
}

#[tokio::test]
async fn expired_offer_cannot_be_bought() {
    let f = fixture();
    let mut offer = f
        .service
        .create_offer(offer_request(), "jimmy.solid")
        .await
        .unwrap();
    offer.valid_to = date(2023, 12, 1);
    f.offers
        .update(offer.clone(), OfferStatus::New)
        .await
        .unwrap();

    let err = f
        .service
        .create_policy(policy_request(&offer.number), "jimmy.solid")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn termination_prorates_premium_and_emits_event() {
    let f = fixture();
    let offer = f
        .service
        .create_offer(offer_request(), "jimmy.solid")
        .await
        .unwrap();
    let policy = f
        .service
        .create_policy(policy_request(&offer.number), "jimmy.solid")
        .await
        .unwrap();

    // 365 days of cover, 182 days used
    let result = f
        .service
        .terminate_policy(
            &policy.number,
            TerminatePolicy {
                termination_date: date(2024, 7, 1),
            },
        )
        .await
        .unwrap();

    // C1: 200 * 182/365 = 99.73, C2: 165 * 182/365 = 82.27
    assert_eq!(result.amount_to_return, dec!(183.00));

    let details = f.service.get_policy(&policy.number).unwrap();
    assert_eq!(details.version_number, 2);
    assert_eq!(details.status, PolicyStatus::Terminated);
    assert_eq!(details.cover_to, date(2024, 7, 1));
    assert_eq!(details.total_premium, dec!(182.00));

    let events = f.sink.events();
    assert!(matches!(
        events.last(),
        Some(IntegrationEvent::PolicyTerminated(e)) if e.amount_to_return == dec!(183.00)
    ));
}

#[tokio::test]
async fn termination_outside_cover_or_twice_is_rejected() {
    let f = fixture();
    let offer = f
        .service
        .create_offer(offer_request(), "jimmy.solid")
        .await
        .unwrap();
    let policy = f
        .service
        .create_policy(policy_request(&offer.number), "jimmy.solid")
        .await
        .unwrap();

    let outside = f
        .service
        .terminate_policy(
            &policy.number,
            TerminatePolicy {
                termination_date: date(2025, 3, 1),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        outside,
        Error::Validation(ValidationError::InvalidDateRange(_))
    ));

    let terminate = TerminatePolicy {
        termination_date: date(2024, 2, 1),
    };
    f.service
        .terminate_policy(&policy.number, terminate.clone())
        .await
        .unwrap();
    let twice = f
        .service
        .terminate_policy(&policy.number, terminate)
        .await
        .unwrap_err();
    assert!(matches!(twice, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn unknown_policy_is_not_found() {
    let f = fixture();
    assert!(matches!(
        f.service.get_policy("missing"),
        Err(Error::NotFound { entity: "Policy", .. })
    ));
}
