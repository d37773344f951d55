//! # Backend contracts
//!
//! This module defines the behaviour that a database backend must expose in order to drive the fulfillment engine.
//!
//! * [`FulfillmentDatabase`] is the highest level of behaviour. It owns the multi-statement write transactions of the
//!   pipeline (order creation, payment reconciliation and the audited status override), as well as the read side.
//! * [`CatalogLookup`] provides the single-table collaborator queries: clients, products with their per-location
//!   stock, payment methods and their client links, and product patching.
//!
//! The public APIs in [`crate::fulfillment_api`] are generic over these traits, so that they can be exercised against
//! a mock backend.
mod catalog_lookup;
mod data_objects;
mod fulfillment_database;

pub use catalog_lookup::CatalogLookup;
pub use data_objects::{CartPlan, LedgerStatusChanged, OrderCreated, OrderLineSummary, PlannedLine, StatusChange};
pub use fulfillment_database::{ErrorKind, FulfillmentDatabase, FulfillmentError};
