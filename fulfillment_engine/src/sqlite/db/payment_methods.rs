use sqlx::SqliteConnection;

use crate::{db_types::PaymentMethod, traits::FulfillmentError};

/// Resolves a payment method by its label. The comparison ignores case and surrounding whitespace.
pub async fn fetch_by_label(label: &str, conn: &mut SqliteConnection) -> Result<Option<PaymentMethod>, FulfillmentError> {
    let method = sqlx::query_as("SELECT id, name FROM payment_methods WHERE LOWER(name) = LOWER($1)")
        .bind(label.trim())
        .fetch_optional(conn)
        .await?;
    Ok(method)
}

pub async fn is_linked(
    client_id: i64,
    payment_method_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, FulfillmentError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM payment_method_links WHERE client_id = $1 AND payment_method_id = $2",
    )
    .bind(client_id)
    .bind(payment_method_id)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

pub async fn insert_method(name: &str, conn: &mut SqliteConnection) -> Result<PaymentMethod, FulfillmentError> {
    let method = sqlx::query_as("INSERT INTO payment_methods (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(method)
}

/// Registers a payment method for a client. Linking twice is a no-op.
pub async fn link_to_client(
    client_id: i64,
    payment_method_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), FulfillmentError> {
    sqlx::query(
        "INSERT INTO payment_method_links (client_id, payment_method_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(client_id)
    .bind(payment_method_id)
    .execute(conn)
    .await?;
    Ok(())
}
