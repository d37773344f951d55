use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    db_types::{LedgerEntry, Money, Order, OrderLine, PaymentReceipt, PaymentStatus, StatusAuditEntry},
    order_objects::{LedgerView, OrderDetail, OrderSummary},
    traits::{
        data_objects::{CartPlan, LedgerStatusChanged, OrderCreated, StatusChange},
        CatalogLookup,
    },
};

/// This trait defines the highest level of behaviour for backends supporting the fulfillment engine.
///
/// Every mutating method here is a single atomic unit of work. If any step fails, none of the writes made by that
/// method are visible afterwards.
#[allow(async_fn_in_trait)]
pub trait FulfillmentDatabase: Clone + CatalogLookup {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Persists a validated cart plan. In a single atomic transaction:
    /// * a new order id is allocated and the order header is stored,
    /// * each planned line is stored with its price snapshot, and the stock at the order's location is decremented,
    ///   provided enough stock remains at the time of the decrement,
    /// * a `PENDING` ledger entry carrying the plan's total is opened.
    ///
    /// If stock for any line has run out since the plan was assembled, [`FulfillmentError::InsufficientStock`] is
    /// returned and nothing is written.
    async fn insert_order_from_plan(&self, plan: &CartPlan) -> Result<OrderCreated, FulfillmentError>;

    /// Fetches the order header for the given id.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, FulfillmentError>;

    /// Fetches the stored lines for the given order, ordered by line id.
    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, FulfillmentError>;

    /// Fetches the ledger entry for the given order. Every stored order has exactly one.
    async fn fetch_ledger_entry(&self, order_id: i64) -> Result<Option<LedgerEntry>, FulfillmentError>;

    /// Marks the order's ledger entry as `PAID` and appends a payment receipt for the client and payment method, in a
    /// single atomic transaction.
    ///
    /// The status change is conditional on the entry not already being `PAID`. If another reconciliation got there
    /// first, [`FulfillmentError::AlreadyPaid`] is returned and no receipt is written.
    async fn reconcile_payment(
        &self,
        order_id: i64,
        client_id: i64,
        payment_method_id: i64,
    ) -> Result<PaymentReceipt, FulfillmentError>;

    /// Overwrites the ledger status for an order and appends an entry to the status audit trail, in a single atomic
    /// transaction.
    ///
    /// Leaving `PAID` is refused with [`FulfillmentError::StatusLocked`] unless `change.force` is set.
    async fn override_ledger_status(
        &self,
        order_id: i64,
        change: StatusChange,
    ) -> Result<LedgerStatusChanged, FulfillmentError>;

    /// Fetches the status audit trail for an order, oldest first.
    async fn fetch_status_audit(&self, order_id: i64) -> Result<Vec<StatusAuditEntry>, FulfillmentError>;

    /// Fetches all the payment receipts issued to a client, oldest first.
    async fn fetch_receipts_for_client(&self, client_id: i64) -> Result<Vec<PaymentReceipt>, FulfillmentError>;

    /// Fetches the full view of a single order: client, location, payment, shipping and line items.
    async fn fetch_order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>, FulfillmentError>;

    /// Fetches all orders with their lines, newest first.
    async fn fetch_order_summaries(&self) -> Result<Vec<OrderSummary>, FulfillmentError>;

    /// Fetches all ledger entries, joined with the paying client and payment method, newest first.
    async fn fetch_ledger_views(&self) -> Result<Vec<LedgerView>, FulfillmentError>;
}

/// The broad category of a [`FulfillmentError`]. Front ends use this to pick a response code without having to know
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    State,
    Unauthorized,
    Internal,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::State => "state",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FulfillmentError {
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("Invalid status '{0}'. Must be one of PAID, PENDING or FAILED")]
    InvalidStatus(String),
    #[error("The product patch does not contain any changes")]
    EmptyPatch,
    #[error("Client #{0} does not exist")]
    ClientNotFound(i64),
    #[error("Product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Payment method '{0}' is not valid")]
    InvalidPaymentMethod(String),
    #[error("Payment method #{payment_method_id} is not linked to client #{client_id}")]
    PaymentMethodNotLinked { client_id: i64, payment_method_id: i64 },
    #[error("Product #{0} is not active")]
    ProductInactive(i64),
    #[error("Insufficient stock for product #{product_id} at location #{location_id}. {requested} requested")]
    InsufficientStock { product_id: i64, location_id: i64, requested: i64 },
    #[error("Order #{0} has already been paid")]
    AlreadyPaid(i64),
    #[error("The payment amount ({received}) does not match the order total ({expected})")]
    AmountMismatch { expected: Money, received: Money },
    #[error("The payment for order #{order_id} is {status}. Set the force flag to change it")]
    StatusLocked { order_id: i64, status: PaymentStatus },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("A record with the same unique key already exists. {0}")]
    DuplicateKey(String),
    #[error("Database engine error: {0}")]
    DatabaseError(String),
}

impl FulfillmentError {
    pub fn kind(&self) -> ErrorKind {
        use FulfillmentError::*;
        match self {
            InvalidRequest(_) | InvalidStatus(_) | EmptyPatch | InvalidPaymentMethod(_) | AmountMismatch { .. } => {
                ErrorKind::Validation
            },
            ClientNotFound(_) | ProductNotFound(_) | OrderNotFound(_) => ErrorKind::NotFound,
            PaymentMethodNotLinked { .. } | ProductInactive(_) | InsufficientStock { .. } | DuplicateKey(_) => {
                ErrorKind::Conflict
            },
            AlreadyPaid(_) | StatusLocked { .. } => ErrorKind::State,
            InvalidCredentials => ErrorKind::Unauthorized,
            DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                FulfillmentError::DuplicateKey(db_err.message().to_string())
            },
            _ => FulfillmentError::DatabaseError(e.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for FulfillmentError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        FulfillmentError::DatabaseError(format!("Migration failed. {e}"))
    }
}
