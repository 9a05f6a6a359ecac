use crate::errors::Result;
use crate::products::products_model::Product;

/// Trait for product catalog storage
pub trait ProductRepositoryTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<Product>>;
    fn find_by_code(&self, code: &str) -> Result<Option<Product>>;
}

/// Trait for product catalog queries
pub trait ProductServiceTrait: Send + Sync {
    fn get_all_products(&self) -> Result<Vec<Product>>;
    fn get_product(&self, code: &str) -> Result<Product>;
}
