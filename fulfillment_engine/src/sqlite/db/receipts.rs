use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::PaymentReceipt, traits::FulfillmentError};

/// Appends a payment receipt. Receipts are never modified once written.
pub async fn insert_receipt(
    id: i64,
    client_id: i64,
    payment_method_id: i64,
    conn: &mut SqliteConnection,
) -> Result<PaymentReceipt, FulfillmentError> {
    let receipt = sqlx::query_as(
        r#"
            INSERT INTO payment_receipts (id, client_id, payment_method_id)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(client_id)
    .bind(payment_method_id)
    .fetch_one(conn)
    .await?;
    debug!("💰️ Receipt #{id} issued to client #{client_id}");
    Ok(receipt)
}

pub async fn fetch_for_client(client_id: i64, conn: &mut SqliteConnection) -> Result<Vec<PaymentReceipt>, FulfillmentError> {
    let receipts = sqlx::query_as("SELECT * FROM payment_receipts WHERE client_id = $1 ORDER BY id")
        .bind(client_id)
        .fetch_all(conn)
        .await?;
    Ok(receipts)
}
