//! Order Fulfillment Engine
//!
//! The fulfillment engine is the core of the order fulfillment back end. Clients place orders against a product
//! catalog with per-location inventory, and pay for them through payment methods registered to their account.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`] and [`mod@traits`]). You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is the data types used in
//!    the database. These are defined in the `db_types` module and are public.
//! 2. The public API ([`mod@fulfillment_api`]). This provides the order pipeline (cart assembly, order creation,
//!    payment reconciliation and status overrides), client login and product patching. Backends need to implement the
//!    traits in [`mod@traits`] in order to drive these APIs.
//!
//! Money, stock and order state never diverge: every pipeline step that writes does so in a single transaction, and
//! stock is claimed with a conditional decrement so that concurrent orders cannot oversell.
pub mod db_types;
pub mod fulfillment_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub mod test_utils;

pub use fulfillment_api::{
    catalog_api::CatalogApi,
    client_api::{ClientApi, PasswordPolicy},
    order_flow_api::OrderFlowApi,
    order_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{CatalogLookup, ErrorKind, FulfillmentDatabase, FulfillmentError};
