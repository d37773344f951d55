use std::fmt::Display;

use fulfillment_engine::order_objects::{LedgerView, OrderSummary, PaymentRecorded};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment: PaymentRecorded,
}

impl From<PaymentRecorded> for PaymentResponse {
    fn from(payment: PaymentRecorded) -> Self {
        let message = format!("Payment #{} recorded for order #{}", payment.payment_id, payment.order_id);
        Self { success: true, message, payment }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderList {
    pub orders: Vec<OrderSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentList {
    pub payments: Vec<LedgerView>,
}
