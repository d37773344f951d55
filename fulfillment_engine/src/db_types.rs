use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use ofp_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------    PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// The ledger entry has been opened, and no payment has been reconciled against it yet.
    Pending,
    /// A payment matching the ledger total has been recorded.
    Paid,
    /// The payment was marked as failed by an operator.
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid payment status: {0}")]
pub struct ConversionError(pub String);

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    /// Status labels are matched case-insensitively, and surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            _ => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    SequenceKind      ---------------------------------------------------------
/// The logical tables that draw their primary keys from the `sequences` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Orders,
    OrderLines,
    PaymentLedger,
    PaymentReceipts,
    StatusAudit,
}

impl SequenceKind {
    /// The name of the counter row for this kind in the `sequences` table.
    pub fn counter_name(&self) -> &'static str {
        match self {
            SequenceKind::Orders => "orders",
            SequenceKind::OrderLines => "order_lines",
            SequenceKind::PaymentLedger => "payment_ledger",
            SequenceKind::PaymentReceipts => "payment_receipts",
            SequenceKind::StatusAudit => "ledger_status_audit",
        }
    }
}

impl Display for SequenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.counter_name())
    }
}

//--------------------------------------        Client        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub national_document: String,
    pub name: String,
    pub lastname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The stored credentials for a client. This never leaves the engine.
#[derive(Clone, FromRow)]
pub struct ClientCredentials {
    pub id: i64,
    pub national_document: String,
    pub name: String,
    pub lastname: String,
    pub password_hash: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClientCredentials(#{}, {}, ****)", self.id, self.national_document)
    }
}

//--------------------------------------       Location       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

//--------------------------------------        Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub slug: String,
    pub category_id: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with the stock held at a single location. Products without an inventory row at the location
/// report a quantity of zero.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProductStock {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub active: bool,
    pub location_id: i64,
    pub quantity: i64,
}

//--------------------------------------     PaymentMethod    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub client_id: i64,
    pub location_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       OrderLine      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// The unit price of the product at the time the order was placed.
    pub price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      LedgerEntry     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub order_id: i64,
    pub payment_method_id: i64,
    pub status: PaymentStatus,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     PaymentReceipt   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub id: i64,
    pub client_id: i64,
    pub payment_method_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    StatusAuditEntry  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StatusAuditEntry {
    pub id: i64,
    pub order_id: i64,
    pub old_status: PaymentStatus,
    pub new_status: PaymentStatus,
    pub actor: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     OrderDelivery    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderDelivery {
    pub order_id: i64,
    pub status: String,
    pub company: String,
    pub delivered_at: Option<DateTime<Utc>>,
}
