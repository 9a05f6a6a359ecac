use policyhub_core::products::{Product, ProductRepositoryTrait};
use policyhub_core::Result;

use crate::table::MemoryTable;

/// Product catalog keyed by upper-cased product code.
pub struct ProductRepository {
    products: MemoryTable<Product>,
}

impl ProductRepository {
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let table = MemoryTable::new("Product");
        for product in products {
            table.insert(&product.code.to_uppercase(), product)?;
        }
        Ok(ProductRepository { products: table })
    }
}

impl ProductRepositoryTrait for ProductRepository {
    fn get_all(&self) -> Result<Vec<Product>> {
        let mut products = self.products.all()?;
        products.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(products)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Product>> {
        self.products.get(&code.to_uppercase())
    }
}
