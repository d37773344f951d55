//! # Fulfillment engine public API
//!
//! The `fulfillment_api` module exposes the programmatic API for the fulfillment engine. The API is modular, so that
//! clients of the API can pick and choose the functionality they want.
//!
//! * [`order_flow_api`] is the primary API. It assembles carts, creates orders, reconciles payments and applies the
//!   administrative status override. It also serves the order and payment read side.
//! * [`client_api`] verifies client credentials under an injected [`client_api::PasswordPolicy`].
//! * [`catalog_api`] applies validated product patches.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
//!
//! ```rust,ignore
//! use fulfillment_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements FulfillmentDatabase
//! let api = OrderFlowApi::new(db);
//! let order = api.get_order(42).await?;
//! ```
pub mod catalog_api;
pub mod client_api;
pub mod order_flow_api;
pub mod order_objects;
