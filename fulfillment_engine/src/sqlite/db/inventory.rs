use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{db_types::ProductStock, traits::FulfillmentError};

/// Fetches the product and the quantity on hand at `location_id`. A missing inventory row counts as zero stock.
pub async fn fetch_product_with_stock(
    product_id: i64,
    location_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductStock>, FulfillmentError> {
    let stock = sqlx::query_as(
        r#"
        SELECT
            p.id AS id,
            p.name AS name,
            p.price AS price,
            p.active AS active,
            CAST($2 AS INTEGER) AS location_id,
            COALESCE(i.quantity, 0) AS quantity
        FROM products p
        LEFT JOIN inventory i ON i.product_id = p.id AND i.location_id = $2
        WHERE p.id = $1
        "#,
    )
    .bind(product_id)
    .bind(location_id)
    .fetch_optional(conn)
    .await?;
    Ok(stock)
}

/// Returns the quantity on hand for a product at a location, or zero if there is no inventory record.
pub async fn stock_level(
    product_id: i64,
    location_id: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, FulfillmentError> {
    let qty: Option<i64> =
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = $1 AND location_id = $2")
            .bind(product_id)
            .bind(location_id)
            .fetch_optional(conn)
            .await?;
    Ok(qty.unwrap_or(0))
}

/// Removes `quantity` units from the stock at `location_id`, but only if at least that many are on hand.
///
/// The check and the decrement happen in the same statement, so two concurrent callers can never both take the last
/// unit. Returns `false`, without changing anything, if the stock was insufficient or the inventory row is missing.
pub async fn decrement_stock(
    product_id: i64,
    location_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, FulfillmentError> {
    let result = sqlx::query(
        r#"
        UPDATE inventory
        SET quantity = quantity - $3, updated_at = CURRENT_TIMESTAMP
        WHERE product_id = $1 AND location_id = $2 AND quantity >= $3
        "#,
    )
    .bind(product_id)
    .bind(location_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    let reserved = result.rows_affected() == 1;
    if reserved {
        trace!("📦️ Reserved {quantity} units of product #{product_id} at location #{location_id}");
    } else {
        debug!("📦️ Could not reserve {quantity} units of product #{product_id} at location #{location_id}");
    }
    Ok(reserved)
}

/// Sets the stock level for a product at a location, creating the inventory record if needed.
pub async fn set_stock_level(
    product_id: i64,
    location_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), FulfillmentError> {
    if quantity < 0 {
        return Err(FulfillmentError::InvalidRequest("Stock levels cannot be negative".into()));
    }
    sqlx::query(
        r#"
        INSERT INTO inventory (product_id, location_id, quantity) VALUES ($1, $2, $3)
        ON CONFLICT (product_id, location_id) DO UPDATE SET quantity = $3, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(product_id)
    .bind(location_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(())
}
