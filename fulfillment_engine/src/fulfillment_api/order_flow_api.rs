use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Money, PaymentStatus},
    order_objects::{LedgerView, NewOrderRequest, NewPayment, OrderDetail, OrderSummary, PaymentRecorded, StatusOverride},
    traits::{
        CartPlan,
        FulfillmentDatabase,
        FulfillmentError,
        LedgerStatusChanged,
        OrderCreated,
        PlannedLine,
        StatusChange,
    },
};

/// `OrderFlowApi` is the primary API for the order and payment pipeline.
///
/// Orders move through three stages:
/// 1. [`Self::assemble_cart`] validates a request against the catalog, without side effects.
/// 2. [`Self::create_order`] persists the plan, reserving stock and opening a `PENDING` ledger entry atomically.
/// 3. [`Self::record_payment`] reconciles a payment against the ledger, or an operator overrides the status with
///    [`Self::update_order_status`].
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: FulfillmentDatabase
{
    /// Validates an order request and produces a [`CartPlan`].
    ///
    /// Checks are made in this order, and the first failure is returned:
    /// * the request shape (at least one item, all quantities positive),
    /// * the client exists,
    /// * the payment method is linked to the client,
    /// * for each item in request order: the product exists, is active, and has enough stock at the location.
    ///
    /// The stock check here is advisory. Stock is only claimed in [`Self::create_order`].
    pub async fn assemble_cart(&self, request: &NewOrderRequest) -> Result<CartPlan, FulfillmentError> {
        request.validate()?;
        let client_id = request.client_id;
        if self.db.fetch_client(client_id).await?.is_none() {
            return Err(FulfillmentError::ClientNotFound(client_id));
        }
        let payment_method_id = request.payment_method_id;
        if !self.db.is_payment_method_linked(client_id, payment_method_id).await? {
            return Err(FulfillmentError::PaymentMethodNotLinked { client_id, payment_method_id });
        }
        let mut lines = Vec::with_capacity(request.items.len());
        let mut total_amount = Money::default();
        for item in &request.items {
            let product = self
                .db
                .fetch_product_with_stock(item.product_id, request.location_id)
                .await?
                .ok_or(FulfillmentError::ProductNotFound(item.product_id))?;
            if !product.active {
                return Err(FulfillmentError::ProductInactive(product.id));
            }
            if product.quantity < item.quantity {
                debug!(
                    "🔄️📦️ Product #{} has {} units at location #{}, but {} were requested",
                    product.id, product.quantity, request.location_id, item.quantity
                );
                return Err(FulfillmentError::InsufficientStock {
                    product_id: product.id,
                    location_id: request.location_id,
                    requested: item.quantity,
                });
            }
            let line = PlannedLine { product_id: product.id, quantity: item.quantity, unit_price: product.price };
            total_amount = line
                .subtotal()
                .and_then(|subtotal| total_amount.checked_add(subtotal))
                .ok_or_else(|| FulfillmentError::InvalidRequest("The order total is too large".into()))?;
            lines.push(line);
        }
        trace!("🔄️📦️ Cart for client #{client_id} assembled with {} lines ({total_amount})", lines.len());
        Ok(CartPlan { client_id, location_id: request.location_id, payment_method_id, lines, total_amount })
    }

    /// Validates the request and, if it passes, creates the order in a single transaction.
    ///
    /// If stock runs out between validation and persistence, [`FulfillmentError::InsufficientStock`] is returned and
    /// nothing is written.
    pub async fn create_order(&self, request: NewOrderRequest) -> Result<OrderCreated, FulfillmentError> {
        let plan = self.assemble_cart(&request).await?;
        let created = self.db.insert_order_from_plan(&plan).await?;
        info!(
            "🔄️📦️ Order #{} created for client #{} with {} lines. Total: {}",
            created.order_id,
            plan.client_id,
            created.items.len(),
            created.total_amount
        );
        Ok(created)
    }

    /// Fetches the full view of an order. This is a pure read.
    pub async fn get_order(&self, order_id: i64) -> Result<OrderDetail, FulfillmentError> {
        self.db.fetch_order_detail(order_id).await?.ok_or(FulfillmentError::OrderNotFound(order_id))
    }

    /// Lists all orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, FulfillmentError> {
        self.db.fetch_order_summaries().await
    }

    /// Lists all ledger entries, newest first.
    pub async fn list_payments(&self) -> Result<Vec<LedgerView>, FulfillmentError> {
        self.db.fetch_ledger_views().await
    }

    /// Reconciles a payment against an order's ledger entry.
    ///
    /// The payment must:
    /// * be for a positive amount,
    /// * reference an existing order,
    /// * name a known payment method (case-insensitive),
    /// * use a method linked to the order's client,
    /// * target an order that is not yet `PAID`,
    /// * match the ledger total exactly.
    ///
    /// If all checks pass, the ledger entry is marked `PAID` and a receipt is issued in one transaction. If a concurrent
    /// payment for the same order wins the race, [`FulfillmentError::AlreadyPaid`] is returned.
    pub async fn record_payment(&self, payment: NewPayment) -> Result<PaymentRecorded, FulfillmentError> {
        payment.validate()?;
        let order_id = payment.order_id;
        let order = self.db.fetch_order(order_id).await?.ok_or(FulfillmentError::OrderNotFound(order_id))?;
        let method = self
            .db
            .fetch_payment_method_by_label(&payment.method)
            .await?
            .ok_or_else(|| FulfillmentError::InvalidPaymentMethod(payment.method.clone()))?;
        if !self.db.is_payment_method_linked(order.client_id, method.id).await? {
            return Err(FulfillmentError::PaymentMethodNotLinked {
                client_id: order.client_id,
                payment_method_id: method.id,
            });
        }
        let entry = self.db.fetch_ledger_entry(order_id).await?.ok_or(FulfillmentError::OrderNotFound(order_id))?;
        if entry.status == PaymentStatus::Paid {
            return Err(FulfillmentError::AlreadyPaid(order_id));
        }
        if payment.amount != entry.total_amount {
            return Err(FulfillmentError::AmountMismatch { expected: entry.total_amount, received: payment.amount });
        }
        let receipt = self.db.reconcile_payment(order_id, order.client_id, method.id).await?;
        info!("🔄️💰️ Payment of {} for order #{order_id} recorded as receipt #{}", payment.amount, receipt.id);
        Ok(PaymentRecorded {
            payment_id: receipt.id,
            order_id,
            amount_paid: payment.amount,
            payment_method: method.name,
            status: PaymentStatus::Paid,
        })
    }

    /// Administrative override of an order's payment status. Every change is recorded in the status audit trail.
    ///
    /// The target status is matched case-insensitively against `PAID`, `PENDING` and `FAILED`. An order that is `PAID`
    /// can only be moved to another status if `force` is set.
    pub async fn update_order_status(
        &self,
        order_id: i64,
        request: StatusOverride,
    ) -> Result<LedgerStatusChanged, FulfillmentError> {
        let new_status = request
            .status
            .parse::<PaymentStatus>()
            .map_err(|_| FulfillmentError::InvalidStatus(request.status.clone()))?;
        let actor = request.actor.trim();
        if actor.is_empty() {
            return Err(FulfillmentError::InvalidRequest("The actor for a status change is required".into()));
        }
        let change = StatusChange { new_status, actor: actor.to_string(), reason: request.reason, force: request.force };
        let result = self.db.override_ledger_status(order_id, change).await?;
        if request.force && result.old_status == PaymentStatus::Paid && result.new_status != PaymentStatus::Paid {
            warn!("🔄️🧾️ {actor} forced order #{order_id} out of PAID into {}", result.new_status);
        }
        Ok(result)
    }
}
