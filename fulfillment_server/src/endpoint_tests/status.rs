use actix_web::{http::StatusCode, test::TestRequest};
use fulfillment_engine::{db_types::PaymentStatus, traits::LedgerStatusChanged, FulfillmentError};
use mockall::predicate::eq;
use serde_json::json;

use super::{
    helpers::{orders_api, send_request, with_admin_key},
    mocks::MockBackend,
};
use crate::{auth::OPERATOR_HEADER, routes::UpdateOrderStatusRoute};

#[actix_web::test]
async fn override_without_access_key() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_override_ledger_status().never();
    let api = orders_api(backend);
    let req = TestRequest::put().uri("/orders/1").set_json(json!({"status": "FAILED"}));
    let err = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateOrderStatusRoute::<MockBackend>::new());
    })
    .await
    .expect_err("Expected error");
    assert_eq!(err.to_string(), "Insufficient Permissions. Required roles: admin");
}

#[actix_web::test]
async fn override_with_wrong_access_key() {
    let _ = env_logger::try_init().ok();
    let api = orders_api(MockBackend::new());
    let req = TestRequest::put()
        .uri("/orders/1")
        .insert_header(("ofp_access_key", "not-the-key"))
        .set_json(json!({"status": "FAILED"}));
    let err = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateOrderStatusRoute::<MockBackend>::new());
    })
    .await
    .expect_err("Expected error");
    assert_eq!(err.to_string(), "Insufficient Permissions. Required roles: admin");
}

#[actix_web::test]
async fn override_records_operator() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_override_ledger_status()
        .withf(|order_id, change| {
            *order_id == 1 &&
                change.new_status == PaymentStatus::Failed &&
                change.actor == "maria" &&
                change.reason.as_deref() == Some("card declined") &&
                !change.force
        })
        .times(1)
        .returning(|order_id, change| {
            Ok(LedgerStatusChanged { order_id, old_status: PaymentStatus::Pending, new_status: change.new_status })
        });
    let api = orders_api(backend);
    let req = with_admin_key(TestRequest::put().uri("/orders/1"))
        .insert_header((OPERATOR_HEADER, "maria"))
        .set_json(json!({"status": "failed", "reason": "card declined"}));
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateOrderStatusRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order #1 payment status changed from PENDING to FAILED"}"#);
}

#[actix_web::test]
async fn override_defaults_to_admin_operator() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_override_ledger_status()
        .withf(|_, change| change.actor == "admin")
        .times(1)
        .returning(|order_id, change| {
            Ok(LedgerStatusChanged { order_id, old_status: PaymentStatus::Failed, new_status: change.new_status })
        });
    let api = orders_api(backend);
    let req = with_admin_key(TestRequest::put().uri("/orders/2")).set_json(json!({"status": "PAID"}));
    let (status, _) = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateOrderStatusRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn override_with_invalid_status() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_override_ledger_status().never();
    let api = orders_api(backend);
    let req = with_admin_key(TestRequest::put().uri("/orders/1")).set_json(json!({"status": "INVALID"}));
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateOrderStatusRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"Invalid status 'INVALID'. Must be one of PAID, PENDING or FAILED","kind":"validation"}"#
    );
}

#[actix_web::test]
async fn override_paid_order_without_force() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_override_ledger_status()
        .with(eq(5), mockall::predicate::always())
        .times(1)
        .returning(|order_id, _| Err(FulfillmentError::StatusLocked { order_id, status: PaymentStatus::Paid }));
    let api = orders_api(backend);
    let req = with_admin_key(TestRequest::put().uri("/orders/5")).set_json(json!({"status": "PENDING"}));
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateOrderStatusRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"The payment for order #5 is PAID. Set the force flag to change it","kind":"state"}"#);
}
