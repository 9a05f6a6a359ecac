use async_trait::async_trait;

use crate::errors::Result;
use crate::pricing::pricing_model::{CalculationResult, PricingParams, Tariff};

/// Trait for tariff storage
pub trait TariffRepositoryTrait: Send + Sync {
    fn find_by_code(&self, code: &str) -> Result<Option<Tariff>>;
    fn get_all(&self) -> Result<Vec<Tariff>>;
}

/// Trait for premium calculation.
///
/// Implemented locally by [`super::PricingService`] and by remote clients when
/// pricing runs in another process.
#[async_trait]
pub trait PricingServiceTrait: Send + Sync {
    async fn calculate_price(&self, params: PricingParams) -> Result<CalculationResult>;
}
