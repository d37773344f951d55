use log::debug;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{Money, Product},
    order_objects::ProductPatch,
    traits::FulfillmentError,
};

/// The fields required to add a product to the catalog.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub slug: String,
    pub category_id: i64,
    pub active: bool,
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, FulfillmentError> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (sku, name, description, price, slug, category_id, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(product.sku)
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.slug)
    .bind(product.category_id)
    .bind(product.active)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, FulfillmentError> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Applies the patch to the product, touching `updated_at`. Only the fields present in the patch are changed.
///
/// Returns `None` if the product does not exist. A slug that clashes with another product results in
/// [`FulfillmentError::DuplicateKey`].
pub async fn update_product(
    product_id: i64,
    patch: ProductPatch,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, FulfillmentError> {
    if patch.is_empty() {
        return Err(FulfillmentError::EmptyPatch);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP");
    if let Some(name) = patch.name {
        builder.push(", name = ");
        builder.push_bind(name);
    }
    if let Some(description) = patch.description {
        builder.push(", description = ");
        builder.push_bind(description);
    }
    if let Some(price) = patch.price {
        builder.push(", price = ");
        builder.push_bind(price);
    }
    if let Some(slug) = patch.slug {
        builder.push(", slug = ");
        builder.push_bind(slug);
    }
    if let Some(category_id) = patch.category_id {
        builder.push(", category_id = ");
        builder.push_bind(category_id);
    }
    if let Some(active) = patch.active {
        builder.push(", active = ");
        builder.push_bind(active);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(" RETURNING *");
    debug!("🛍️ Updating product #{product_id}: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    Ok(product)
}
