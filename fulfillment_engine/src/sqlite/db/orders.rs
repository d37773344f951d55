use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{Money, Order, OrderLine, PaymentStatus},
    order_objects::{
        ClientRef,
        LocationRef,
        OrderDetail,
        OrderLineBrief,
        OrderLineDetail,
        OrderSummary,
        PaymentSummary,
        ShippingInfo,
    },
    traits::{FulfillmentError, PlannedLine},
};

/// Inserts a new order header using the given connection. This is not atomic. You can embed this call inside a
/// transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    id: i64,
    client_id: i64,
    location_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Order, FulfillmentError> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (id, client_id, location_id)
            VALUES ($1, $2, $3)
            RETURNING id, client_id, location_id, created_at, updated_at;
        "#,
    )
    .bind(id)
    .bind(client_id)
    .bind(location_id)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order #{id} inserted for client #{client_id}");
    Ok(order)
}

/// Inserts a single order line. The line keeps a copy of the unit price, so later catalog price changes do not
/// affect it.
pub async fn insert_order_line(
    id: i64,
    order_id: i64,
    line: &PlannedLine,
    conn: &mut SqliteConnection,
) -> Result<OrderLine, FulfillmentError> {
    let line = sqlx::query_as(
        r#"
            INSERT INTO order_lines (id, order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(line.unit_price)
    .fetch_one(conn)
    .await?;
    Ok(line)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, FulfillmentError> {
    let order = sqlx::query_as("SELECT id, client_id, location_id, created_at, updated_at FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, FulfillmentError> {
    let lines = sqlx::query_as("SELECT * FROM order_lines WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

#[derive(Debug, FromRow)]
struct OrderHeaderRow {
    order_id: i64,
    client_id: i64,
    client_name: String,
    client_document: String,
    location_id: i64,
    location_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    payment_status: PaymentStatus,
    payment_method: String,
    payment_method_id: i64,
    total_amount: Money,
    shipping_status: String,
    shipping_company: String,
    delivered_at: Option<DateTime<Utc>>,
}

/// Builds the full view of a single order. Returns `None` if the order (or its ledger entry) does not exist.
pub async fn fetch_order_detail(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderDetail>, FulfillmentError> {
    let header: Option<OrderHeaderRow> = sqlx::query_as(
        r#"
        SELECT
            o.id AS order_id,
            o.client_id AS client_id,
            c.name || ' ' || c.lastname AS client_name,
            c.national_document AS client_document,
            o.location_id AS location_id,
            l.name AS location_name,
            o.created_at AS created_at,
            o.updated_at AS updated_at,
            pl.status AS payment_status,
            pm.name AS payment_method,
            pm.id AS payment_method_id,
            pl.total_amount AS total_amount,
            COALESCE(d.status, 'NOT_SHIPPED') AS shipping_status,
            COALESCE(d.company, '') AS shipping_company,
            d.delivered_at AS delivered_at
        FROM orders o
        JOIN clients c ON o.client_id = c.id
        JOIN payment_ledger pl ON pl.order_id = o.id
        JOIN payment_methods pm ON pl.payment_method_id = pm.id
        LEFT JOIN order_deliveries d ON d.order_id = o.id
        LEFT JOIN locations l ON o.location_id = l.id
        WHERE o.id = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    let header = match header {
        Some(h) => h,
        None => return Ok(None),
    };
    let products: Vec<OrderLineDetail> = sqlx::query_as(
        r#"
        SELECT
            ol.id AS line_id,
            ol.product_id AS product_id,
            p.name AS product_name,
            p.description AS product_description,
            p.sku AS product_sku,
            ol.quantity AS quantity,
            ol.price AS unit_price,
            ol.quantity * ol.price AS subtotal,
            ol.created_at AS added_at,
            ol.updated_at AS updated_at
        FROM order_lines ol
        JOIN products p ON ol.product_id = p.id
        WHERE ol.order_id = $1
        ORDER BY ol.id
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    let calculated_total = products.iter().map(|p| p.subtotal).sum::<Money>();
    let detail = OrderDetail {
        order_id: header.order_id,
        client: ClientRef { id: header.client_id, name: header.client_name, document: header.client_document },
        location: LocationRef { id: header.location_id, name: header.location_name.unwrap_or_default() },
        created_at: header.created_at,
        updated_at: header.updated_at,
        payment: PaymentSummary {
            method: header.payment_method,
            method_id: header.payment_method_id,
            status: header.payment_status,
            total_amount: header.total_amount,
            calculated_total,
        },
        shipping: ShippingInfo {
            status: header.shipping_status,
            company: header.shipping_company,
            delivered_at: header.delivered_at,
        },
        products,
    };
    Ok(Some(detail))
}

#[derive(Debug, FromRow)]
struct OrderSummaryRow {
    order_id: i64,
    client_id: i64,
    client_name: String,
    location_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    payment_status: PaymentStatus,
    payment_method: String,
    total_amount: Money,
}

/// Fetches every order with its lines, newest first.
pub async fn fetch_order_summaries(conn: &mut SqliteConnection) -> Result<Vec<OrderSummary>, FulfillmentError> {
    let rows: Vec<OrderSummaryRow> = sqlx::query_as(
        r#"
        SELECT
            o.id AS order_id,
            o.client_id AS client_id,
            c.name || ' ' || c.lastname AS client_name,
            o.location_id AS location_id,
            o.created_at AS created_at,
            o.updated_at AS updated_at,
            pl.status AS payment_status,
            pm.name AS payment_method,
            pl.total_amount AS total_amount
        FROM orders o
        JOIN clients c ON o.client_id = c.id
        JOIN payment_ledger pl ON pl.order_id = o.id
        JOIN payment_methods pm ON pl.payment_method_id = pm.id
        ORDER BY o.id DESC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let products = fetch_line_briefs(row.order_id, &mut *conn).await?;
        summaries.push(OrderSummary {
            order_id: row.order_id,
            client_id: row.client_id,
            client_name: row.client_name,
            location_id: row.location_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            total_amount: row.total_amount,
            products,
        });
    }
    Ok(summaries)
}

async fn fetch_line_briefs(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLineBrief>, FulfillmentError> {
    let lines = sqlx::query_as(
        r#"
        SELECT
            ol.product_id AS product_id,
            p.name AS product_name,
            ol.quantity AS quantity,
            ol.price AS price,
            ol.quantity * ol.price AS subtotal
        FROM order_lines ol
        JOIN products p ON ol.product_id = p.id
        WHERE ol.order_id = $1
        ORDER BY ol.id
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}
