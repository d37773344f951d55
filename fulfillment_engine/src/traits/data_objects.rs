use serde::{Deserialize, Serialize};

use crate::db_types::{Money, PaymentStatus};

/// A single validated cart line, with the unit price captured at validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
}

impl PlannedLine {
    /// `unit_price × quantity`, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// The output of cart assembly. A plan has been checked against the catalog and stock levels, but nothing has been
/// reserved yet. Stock is only claimed when the plan is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPlan {
    pub client_id: i64,
    pub location_id: i64,
    pub payment_method_id: i64,
    pub lines: Vec<PlannedLine>,
    pub total_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineSummary {
    pub product_id: i64,
    pub price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: i64,
    pub total_amount: Money,
    pub items: Vec<OrderLineSummary>,
}

/// An administrative request to overwrite a ledger status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub new_status: PaymentStatus,
    /// Who is making the change. Recorded in the audit trail.
    pub actor: String,
    pub reason: Option<String>,
    /// Required to move a ledger entry out of `PAID`.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatusChanged {
    pub order_id: i64,
    pub old_status: PaymentStatus,
    pub new_status: PaymentStatus,
}
