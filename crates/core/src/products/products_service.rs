use std::sync::Arc;

use super::products_model::Product;
use super::products_traits::{ProductRepositoryTrait, ProductServiceTrait};
use crate::errors::{Error, Result};

pub struct ProductService {
    repository: Arc<dyn ProductRepositoryTrait>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl ProductServiceTrait for ProductService {
    fn get_all_products(&self) -> Result<Vec<Product>> {
        self.repository.get_all()
    }

    fn get_product(&self, code: &str) -> Result<Product> {
        self.repository
            .find_by_code(code)?
            .ok_or_else(|| Error::not_found("Product", code))
    }
}
