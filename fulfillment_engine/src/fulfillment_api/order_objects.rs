use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    db_types::{Money, PaymentStatus},
    traits::FulfillmentError,
};

//--------------------------------------    Order requests    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    #[serde(alias = "productId")]
    pub product_id: i64,
    pub quantity: i64,
}

impl OrderItemRequest {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    #[serde(alias = "clientId")]
    pub client_id: i64,
    #[serde(alias = "locationId")]
    pub location_id: i64,
    #[serde(alias = "paymentMethodId")]
    pub payment_method_id: i64,
    pub items: Vec<OrderItemRequest>,
}

impl NewOrderRequest {
    pub fn new(client_id: i64, location_id: i64, payment_method_id: i64) -> Self {
        Self { client_id, location_id, payment_method_id, items: vec![] }
    }

    pub fn with_item(mut self, product_id: i64, quantity: i64) -> Self {
        self.items.push(OrderItemRequest::new(product_id, quantity));
        self
    }

    /// Checks the shape of the request. No I/O is performed.
    pub fn validate(&self) -> Result<(), FulfillmentError> {
        if self.items.is_empty() {
            return Err(FulfillmentError::InvalidRequest("An order must contain at least one item".into()));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(FulfillmentError::InvalidRequest(format!(
                "The quantity for product #{} must be greater than zero",
                item.product_id
            )));
        }
        Ok(())
    }
}

//--------------------------------------   Payment requests   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    #[serde(alias = "orderId")]
    pub order_id: i64,
    pub amount: Money,
    /// The payment method label, e.g. "Credit Card". Matched case-insensitively.
    pub method: String,
}

impl NewPayment {
    pub fn new<S: Into<String>>(order_id: i64, amount: Money, method: S) -> Self {
        Self { order_id, amount, method: method.into() }
    }

    pub fn validate(&self) -> Result<(), FulfillmentError> {
        if !self.amount.is_positive() {
            return Err(FulfillmentError::InvalidRequest("The payment amount must be greater than zero".into()));
        }
        if self.method.trim().is_empty() {
            return Err(FulfillmentError::InvalidRequest("A payment method is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub payment_id: i64,
    pub order_id: i64,
    pub amount_paid: Money,
    pub payment_method: String,
    pub status: PaymentStatus,
}

//--------------------------------------    Status override   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOverride {
    pub status: String,
    #[serde(default = "default_actor")]
    pub actor: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub force: bool,
}

fn default_actor() -> String {
    "admin".to_string()
}

impl StatusOverride {
    pub fn new<S: Into<String>>(status: S) -> Self {
        Self { status: status.into(), actor: default_actor(), reason: None, force: false }
    }

    pub fn with_actor<S: Into<String>>(mut self, actor: S) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

//--------------------------------------     Product patch    ---------------------------------------------------------
/// The set of product fields that may be changed after creation. Every field is optional, but at least one must be
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub slug: Option<String>,
    pub category_id: Option<i64>,
    pub active: Option<bool>,
}

impl ProductPatch {
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_slug<S: Into<String>>(mut self, slug: S) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.description.is_none() &&
            self.price.is_none() &&
            self.slug.is_none() &&
            self.category_id.is_none() &&
            self.active.is_none()
    }

    pub fn validate(&self) -> Result<(), FulfillmentError> {
        if self.is_empty() {
            return Err(FulfillmentError::EmptyPatch);
        }
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(FulfillmentError::InvalidRequest("Product name cannot be empty".into()));
        }
        if matches!(&self.slug, Some(s) if s.trim().is_empty()) {
            return Err(FulfillmentError::InvalidRequest("Product slug cannot be empty".into()));
        }
        if matches!(self.price, Some(p) if p.value() < 0) {
            return Err(FulfillmentError::InvalidRequest("Product price cannot be negative".into()));
        }
        if matches!(self.category_id, Some(c) if c <= 0) {
            return Err(FulfillmentError::InvalidRequest("Category id must be positive".into()));
        }
        Ok(())
    }
}

//--------------------------------------      Credentials     ---------------------------------------------------------
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub national_document: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoginRequest({}, ****)", self.national_document)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: i64,
    pub national_document: String,
    pub name: String,
    pub lastname: String,
}

//--------------------------------------      Order detail    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: i64,
    pub name: String,
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub method: String,
    pub method_id: i64,
    pub status: PaymentStatus,
    /// The total recorded on the ledger entry when the order was created.
    pub total_amount: Money,
    /// The total recomputed from the stored order lines.
    pub calculated_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub status: String,
    pub company: String,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Default for ShippingInfo {
    fn default() -> Self {
        Self { status: "NOT_SHIPPED".to_string(), company: String::new(), delivered_at: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderLineDetail {
    pub line_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_description: String,
    pub product_sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_id: i64,
    pub client: ClientRef,
    pub location: LocationRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payment: PaymentSummary,
    pub shipping: ShippingInfo,
    pub products: Vec<OrderLineDetail>,
}

//--------------------------------------      Order listing   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderLineBrief {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub location_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub total_amount: Money,
    pub products: Vec<OrderLineBrief>,
}

//--------------------------------------     Ledger listing   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LedgerView {
    pub ledger_id: i64,
    pub order_id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub national_document: String,
    pub payment_method: String,
    pub total_amount: Money,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
