use log::{debug, info};
use sqlx::SqliteConnection;

use crate::{
    db_types::{LedgerEntry, Money, PaymentStatus, StatusAuditEntry},
    order_objects::LedgerView,
    traits::FulfillmentError,
};

/// Opens the ledger entry for a new order with `PENDING` status.
pub async fn insert_pending_entry(
    id: i64,
    order_id: i64,
    payment_method_id: i64,
    total_amount: Money,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, FulfillmentError> {
    let entry = sqlx::query_as(
        r#"
            INSERT INTO payment_ledger (id, order_id, payment_method_id, status, total_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(payment_method_id)
    .bind(PaymentStatus::Pending)
    .bind(total_amount)
    .fetch_one(conn)
    .await?;
    debug!("🧾️ Ledger entry #{id} opened for order #{order_id} ({total_amount})");
    Ok(entry)
}

pub async fn fetch_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<LedgerEntry>, FulfillmentError> {
    let entry = sqlx::query_as("SELECT * FROM payment_ledger WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(entry)
}

/// Sets the ledger entry for the order to `PAID`, provided it is not `PAID` already.
///
/// Returns `false` if nothing changed, which means either there is no entry for the order or another payment has
/// already been reconciled against it.
pub async fn mark_paid(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, FulfillmentError> {
    let result = sqlx::query(
        r#"
        UPDATE payment_ledger
        SET status = $2, updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $1 AND status <> $2
        "#,
    )
    .bind(order_id)
    .bind(PaymentStatus::Paid)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Unconditionally overwrites the ledger status. Returns the updated entry, or `None` if the order has no entry.
pub async fn set_status(
    order_id: i64,
    status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, FulfillmentError> {
    let entry = sqlx::query_as(
        "UPDATE payment_ledger SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE order_id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(status)
    .fetch_optional(conn)
    .await?;
    Ok(entry)
}

pub async fn insert_audit_entry(
    id: i64,
    order_id: i64,
    old_status: PaymentStatus,
    new_status: PaymentStatus,
    actor: &str,
    reason: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<StatusAuditEntry, FulfillmentError> {
    let entry = sqlx::query_as(
        r#"
            INSERT INTO ledger_status_audit (id, order_id, old_status, new_status, actor, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(old_status)
    .bind(new_status)
    .bind(actor)
    .bind(reason)
    .fetch_one(conn)
    .await?;
    info!("🧾️ {actor} changed the payment status of order #{order_id} from {old_status} to {new_status}");
    Ok(entry)
}

pub async fn fetch_audit_trail(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<StatusAuditEntry>, FulfillmentError> {
    let entries = sqlx::query_as("SELECT * FROM ledger_status_audit WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(entries)
}

/// Fetches every ledger entry with its client and payment method, newest first.
pub async fn fetch_ledger_views(conn: &mut SqliteConnection) -> Result<Vec<LedgerView>, FulfillmentError> {
    let views = sqlx::query_as(
        r#"
        SELECT
            pl.id AS ledger_id,
            pl.order_id AS order_id,
            c.id AS client_id,
            c.name || ' ' || c.lastname AS client_name,
            c.national_document AS national_document,
            pm.name AS payment_method,
            pl.total_amount AS total_amount,
            pl.status AS payment_status,
            pl.created_at AS created_at,
            pl.updated_at AS updated_at
        FROM payment_ledger pl
        JOIN orders o ON pl.order_id = o.id
        JOIN clients c ON o.client_id = c.id
        JOIN payment_methods pm ON pl.payment_method_id = pm.id
        ORDER BY pl.id DESC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(views)
}
