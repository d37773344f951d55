use std::fmt::Debug;

use log::*;

use crate::{
    db_types::Product,
    order_objects::ProductPatch,
    traits::{CatalogLookup, FulfillmentError},
};

/// `CatalogApi` serves product records and applies administrative changes to the product catalog.
pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogLookup
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn get_product(&self, product_id: i64) -> Result<Product, FulfillmentError> {
        self.db.fetch_product(product_id).await?.ok_or(FulfillmentError::ProductNotFound(product_id))
    }

    /// Validates and applies a product patch. Order lines that were already created keep their original price.
    pub async fn update_product(&self, product_id: i64, patch: ProductPatch) -> Result<Product, FulfillmentError> {
        patch.validate()?;
        let product = self.db.update_product(product_id, patch).await?;
        info!("🛍️ Product #{product_id} ({}) updated", product.sku);
        Ok(product)
    }
}
