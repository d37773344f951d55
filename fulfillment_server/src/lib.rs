//! # Order fulfillment server
//! This crate hosts the HTTP front end for the fulfillment engine. It is responsible for:
//! Parsing JSON requests and handing them to the engine APIs.
//! Guarding administrative routes with the access key ACL.
//! Rendering engine errors as JSON with a stable status code and error kind.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders`: Place (`POST`) and list (`GET`) orders.
//! * `/api/orders/{id}`: Fetch (`GET`) an order, or override its payment status (`PUT`, admin only).
//! * `/api/payments`: Record (`POST`) and list (`GET`) payments.
//! * `/api/users/login`: Verify a client's credentials.
//! * `/api/products/{id}`: Patch a product (`PUT`, admin only).

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
