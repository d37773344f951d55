use actix_web::{http::StatusCode, test::TestRequest};
use fulfillment_engine::{
    db_types::Money,
    traits::{OrderCreated, OrderLineSummary},
    FulfillmentError,
};
use mockall::predicate::eq;
use serde_json::{json, Value};

use super::{
    helpers::{client, orders_api, send_request, stock},
    mocks::MockBackend,
};
use crate::routes::{CreateOrderRoute, GetOrderRoute, ListOrdersRoute};

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_client().with(eq(1)).times(1).returning(|id| Ok(Some(client(id))));
    backend.expect_is_payment_method_linked().with(eq(1), eq(2)).times(1).returning(|_, _| Ok(true));
    backend
        .expect_fetch_product_with_stock()
        .with(eq(10), eq(1))
        .times(1)
        .returning(|id, _| Ok(Some(stock(id, 10, 5))));
    backend
        .expect_fetch_product_with_stock()
        .with(eq(11), eq(1))
        .times(1)
        .returning(|id, _| Ok(Some(stock(id, 5, 5))));
    backend
        .expect_insert_order_from_plan()
        .withf(|plan| plan.total_amount == Money::from(25) && plan.lines.len() == 2)
        .times(1)
        .returning(|plan| {
            let items = plan
                .lines
                .iter()
                .map(|l| OrderLineSummary {
                    product_id: l.product_id,
                    price: l.unit_price,
                    quantity: l.quantity,
                    subtotal: l.unit_price * l.quantity,
                })
                .collect();
            Ok(OrderCreated { order_id: 7, total_amount: plan.total_amount, items })
        });
    let api = orders_api(backend);
    let body = json!({
        "clientId": 1,
        "locationId": 1,
        "paymentMethodId": 2,
        "items": [{ "productId": 10, "quantity": 2 }, { "product_id": 11, "quantity": 1 }]
    });
    let req = TestRequest::post().uri("/orders").set_json(body);
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(CreateOrderRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["order_id"], 7);
    assert_eq!(order["total_amount"], 25);
    assert_eq!(order["items"][0]["subtotal"], 20);
    assert_eq!(order["items"][1]["price"], 5);
}

#[actix_web::test]
async fn create_order_without_items() {
    let _ = env_logger::try_init().ok();
    let api = orders_api(MockBackend::new());
    let req = TestRequest::post().uri("/orders").set_json(json!({
        "client_id": 1, "location_id": 1, "payment_method_id": 2, "items": []
    }));
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(CreateOrderRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "validation");
    assert_eq!(err["error"], "Invalid request. An order must contain at least one item");
}

#[actix_web::test]
async fn create_order_with_insufficient_stock() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_client().returning(|id| Ok(Some(client(id))));
    backend.expect_is_payment_method_linked().returning(|_, _| Ok(true));
    backend.expect_fetch_product_with_stock().returning(|id, _| Ok(Some(stock(id, 10, 1))));
    backend.expect_insert_order_from_plan().never();
    let api = orders_api(backend);
    let req = TestRequest::post().uri("/orders").set_json(json!({
        "client_id": 1, "location_id": 1, "payment_method_id": 2, "items": [{ "product_id": 10, "quantity": 3 }]
    }));
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(CreateOrderRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "conflict");
}

#[actix_web::test]
async fn malformed_order_body() {
    let _ = env_logger::try_init().ok();
    let api = orders_api(MockBackend::new());
    let req = TestRequest::post()
        .uri("/orders")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"client_id": "one"}"#);
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(CreateOrderRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "validation");
}

#[actix_web::test]
async fn fetch_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_detail().with(eq(42)).times(1).returning(|_| Ok(None));
    let api = orders_api(backend);
    let req = TestRequest::get().uri("/orders/42");
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(GetOrderRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Order #42 does not exist","kind":"not_found"}"#);
}

#[actix_web::test]
async fn list_orders_when_empty() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_summaries().times(1).returning(|| Ok(vec![]));
    let api = orders_api(backend);
    let req = TestRequest::get().uri("/orders");
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(ListOrdersRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"orders":[]}"#);
}

#[actix_web::test]
async fn database_errors_are_masked() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order_summaries()
        .returning(|| Err(FulfillmentError::DatabaseError("database is locked".into())));
    let api = orders_api(backend);
    let req = TestRequest::get().uri("/orders");
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(ListOrdersRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("locked"));
}
