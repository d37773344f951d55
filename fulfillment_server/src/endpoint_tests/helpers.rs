use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use anyhow::anyhow;
use chrono::{TimeZone, Utc};
use fulfillment_engine::{
    db_types::{Client, LedgerEntry, Money, Order, PaymentMethod, PaymentStatus, ProductStock},
    OrderFlowApi,
};
use log::debug;

use super::mocks::MockBackend;
use crate::{
    auth::ACCESS_KEY_HEADER,
    config::AccessKeys,
    server::json_config,
};

// DO NOT re-use this key anywhere.
pub const ADMIN_KEY: &str = "d2d9c2c07a5b0f0a5a6f3d1e";

/// Sends `req` to an app holding the test access keys and whatever `configure` registers. Errors raised by middleware
/// (rather than handlers) are returned as `Err`.
pub async fn send_request<F>(req: TestRequest, configure: F) -> anyhow::Result<(StatusCode, String)>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .app_data(web::Data::new(AccessKeys::new(ADMIN_KEY)))
        .app_data(json_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| anyhow!("{e}"))?.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().map_err(|_| anyhow!("Could not read response body"))?;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

pub fn with_admin_key(req: TestRequest) -> TestRequest {
    req.insert_header((ACCESS_KEY_HEADER, ADMIN_KEY))
}

pub fn orders_api(backend: MockBackend) -> web::Data<OrderFlowApi<MockBackend>> {
    web::Data::new(OrderFlowApi::new(backend))
}

pub fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
}

pub fn client(id: i64) -> Client {
    Client {
        id,
        national_document: "1001".into(),
        name: "Ana".into(),
        lastname: "Rojas".into(),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn stock(id: i64, price: i64, quantity: i64) -> ProductStock {
    let name = format!("Product {id}");
    ProductStock { id, name, price: Money::from(price), active: true, location_id: 1, quantity }
}

pub fn order(id: i64, client_id: i64) -> Order {
    Order { id, client_id, location_id: 1, created_at: timestamp(), updated_at: timestamp() }
}

pub fn ledger_entry(order_id: i64, status: PaymentStatus, total: i64) -> LedgerEntry {
    LedgerEntry {
        id: order_id,
        order_id,
        payment_method_id: 1,
        status,
        total_amount: Money::from(total),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn card() -> PaymentMethod {
    PaymentMethod { id: 1, name: "Credit Card".into() }
}
