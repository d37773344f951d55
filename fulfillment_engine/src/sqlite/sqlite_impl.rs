//! `SqliteDatabase` is a concrete implementation of a fulfillment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every write transaction opens with a write statement (an id allocation or a conditional update). SQLite therefore
//! takes the write lock at the start of the transaction, and concurrent writers queue on the busy timeout instead of
//! failing part way through.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{clients, db_url, inventory, ledger, new_pool, orders, payment_methods, products, receipts, sequences};
use crate::{
    db_types::{
        Client,
        ClientCredentials,
        LedgerEntry,
        Money,
        Order,
        OrderLine,
        PaymentMethod,
        PaymentReceipt,
        PaymentStatus,
        Product,
        ProductStock,
        SequenceKind,
        StatusAuditEntry,
    },
    order_objects::{LedgerView, OrderDetail, OrderSummary, ProductPatch},
    traits::{
        CartPlan,
        CatalogLookup,
        FulfillmentDatabase,
        FulfillmentError,
        LedgerStatusChanged,
        OrderCreated,
        OrderLineSummary,
        StatusChange,
    },
};

const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl FulfillmentDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order_from_plan(&self, plan: &CartPlan) -> Result<OrderCreated, FulfillmentError> {
        let total_amount = plan_total(plan)?;
        let mut tx = self.pool.begin().await?;
        let order_id = sequences::next_id(SequenceKind::Orders, &mut tx).await?;
        let order = orders::insert_order(order_id, plan.client_id, plan.location_id, &mut tx).await?;
        let mut items = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let line_id = sequences::next_id(SequenceKind::OrderLines, &mut tx).await?;
            let stored = orders::insert_order_line(line_id, order.id, line, &mut tx).await?;
            let reserved = inventory::decrement_stock(line.product_id, plan.location_id, line.quantity, &mut tx).await?;
            if !reserved {
                // Dropping `tx` rolls back the order, any earlier lines and their stock reservations.
                warn!(
                    "🗃️ Stock for product #{} ran out while order #{order_id} was being saved. Rolling back.",
                    line.product_id
                );
                return Err(FulfillmentError::InsufficientStock {
                    product_id: line.product_id,
                    location_id: plan.location_id,
                    requested: line.quantity,
                });
            }
            let subtotal = stored.price * stored.quantity;
            items.push(OrderLineSummary {
                product_id: stored.product_id,
                price: stored.price,
                quantity: stored.quantity,
                subtotal,
            });
        }
        let ledger_id = sequences::next_id(SequenceKind::PaymentLedger, &mut tx).await?;
        let entry =
            ledger::insert_pending_entry(ledger_id, order.id, plan.payment_method_id, total_amount, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} has been saved in the DB with {} lines ({})", order.id, items.len(), entry.total_amount);
        Ok(OrderCreated { order_id: order.id, total_amount: entry.total_amount, items })
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(order_id, &mut conn).await
    }

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_lines(order_id, &mut conn).await
    }

    async fn fetch_ledger_entry(&self, order_id: i64) -> Result<Option<LedgerEntry>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_for_order(order_id, &mut conn).await
    }

    async fn reconcile_payment(
        &self,
        order_id: i64,
        client_id: i64,
        payment_method_id: i64,
    ) -> Result<PaymentReceipt, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        if !ledger::mark_paid(order_id, &mut tx).await? {
            let entry = ledger::fetch_for_order(order_id, &mut tx).await?;
            return match entry {
                Some(_) => {
                    debug!("🗃️ Order #{order_id} was paid by a concurrent request");
                    Err(FulfillmentError::AlreadyPaid(order_id))
                },
                None => Err(FulfillmentError::OrderNotFound(order_id)),
            };
        }
        let receipt_id = sequences::next_id(SequenceKind::PaymentReceipts, &mut tx).await?;
        let receipt = receipts::insert_receipt(receipt_id, client_id, payment_method_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} marked as paid. Receipt #{receipt_id}");
        Ok(receipt)
    }

    async fn override_ledger_status(
        &self,
        order_id: i64,
        change: StatusChange,
    ) -> Result<LedgerStatusChanged, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let audit_id = sequences::next_id(SequenceKind::StatusAudit, &mut tx).await?;
        let current =
            ledger::fetch_for_order(order_id, &mut tx).await?.ok_or(FulfillmentError::OrderNotFound(order_id))?;
        let old_status = current.status;
        if old_status == PaymentStatus::Paid && change.new_status != PaymentStatus::Paid && !change.force {
            return Err(FulfillmentError::StatusLocked { order_id, status: old_status });
        }
        let updated = ledger::set_status(order_id, change.new_status, &mut tx)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        ledger::insert_audit_entry(
            audit_id,
            order_id,
            old_status,
            updated.status,
            &change.actor,
            change.reason.as_deref(),
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        Ok(LedgerStatusChanged { order_id, old_status, new_status: updated.status })
    }

    async fn fetch_status_audit(&self, order_id: i64) -> Result<Vec<StatusAuditEntry>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_audit_trail(order_id, &mut conn).await
    }

    async fn fetch_receipts_for_client(&self, client_id: i64) -> Result<Vec<PaymentReceipt>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        receipts::fetch_for_client(client_id, &mut conn).await
    }

    async fn fetch_order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>, FulfillmentError> {
        // A read transaction, so that the header and the lines come from the same snapshot.
        let mut tx = self.pool.begin().await?;
        let detail = orders::fetch_order_detail(order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(detail)
    }

    async fn fetch_order_summaries(&self) -> Result<Vec<OrderSummary>, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let summaries = orders::fetch_order_summaries(&mut tx).await?;
        tx.commit().await?;
        Ok(summaries)
    }

    async fn fetch_ledger_views(&self) -> Result<Vec<LedgerView>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_ledger_views(&mut conn).await
    }
}

impl CatalogLookup for SqliteDatabase {
    async fn fetch_client(&self, client_id: i64) -> Result<Option<Client>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        clients::fetch_client(client_id, &mut conn).await
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(product_id, &mut conn).await
    }

    async fn fetch_product_with_stock(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> Result<Option<ProductStock>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        inventory::fetch_product_with_stock(product_id, location_id, &mut conn).await
    }

    async fn is_payment_method_linked(&self, client_id: i64, payment_method_id: i64) -> Result<bool, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        payment_methods::is_linked(client_id, payment_method_id, &mut conn).await
    }

    async fn fetch_payment_method_by_label(&self, label: &str) -> Result<Option<PaymentMethod>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        payment_methods::fetch_by_label(label, &mut conn).await
    }

    async fn fetch_client_credentials(
        &self,
        national_document: &str,
    ) -> Result<Option<ClientCredentials>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        clients::fetch_credentials(national_document, &mut conn).await
    }

    async fn update_product(&self, product_id: i64, patch: ProductPatch) -> Result<Product, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::update_product(product_id, patch, &mut conn)
            .await?
            .ok_or(FulfillmentError::ProductNotFound(product_id))?;
        debug!("🗃️ Product #{product_id} updated");
        Ok(product)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the `OFP_DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    /// Creates a new database API object
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let max_connections = if max_connections == 0 { DEFAULT_MAX_CONNECTIONS } else { max_connections };
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Created new database connection pool for {url} with {max_connections} connections");
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date. Migrations are embedded in the binary.
    pub async fn run_migrations(&self) -> Result<(), FulfillmentError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

/// Recomputes the plan total from its lines. A plan whose stated total disagrees with its lines is rejected, so the
/// ledger total always equals the sum of the stored lines.
fn plan_total(plan: &CartPlan) -> Result<Money, FulfillmentError> {
    if plan.lines.is_empty() {
        return Err(FulfillmentError::InvalidRequest("An order must contain at least one item".into()));
    }
    let total = plan.lines.iter().try_fold(Money::default(), |acc, line| {
        if line.quantity <= 0 {
            return None;
        }
        line.subtotal().and_then(|s| acc.checked_add(s))
    });
    match total {
        Some(total) if total == plan.total_amount => Ok(total),
        Some(total) => Err(FulfillmentError::InvalidRequest(format!(
            "The cart total ({}) does not match the sum of its lines ({total})",
            plan.total_amount
        ))),
        None => Err(FulfillmentError::InvalidRequest("The cart contains an invalid line".into())),
    }
}
