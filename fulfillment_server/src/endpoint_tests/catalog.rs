use std::time::{Duration, Instant};

use actix_web::{http::StatusCode, test::TestRequest, web};
use fulfillment_engine::{
    db_types::{ClientCredentials, Money, Product},
    CatalogApi,
    ClientApi,
    PasswordPolicy,
};
use mockall::predicate::eq;
use serde_json::{json, Value};

use super::{
    helpers::{send_request, timestamp, with_admin_key},
    mocks::MockBackend,
};
use crate::routes::{GetProductRoute, LoginRoute, UpdateProductRoute};

fn login_api(backend: MockBackend) -> web::Data<ClientApi<MockBackend>> {
    login_api_with_cost(backend, 4)
}

fn login_api_with_cost(backend: MockBackend, cost: u32) -> web::Data<ClientApi<MockBackend>> {
    let policy = PasswordPolicy::new(cost).unwrap();
    web::Data::new(ClientApi::new(backend, policy).unwrap())
}

fn coffee(id: i64, price: i64) -> Product {
    Product {
        id,
        sku: "COF-001".into(),
        name: "Coffee".into(),
        description: "Ground coffee".into(),
        price: Money::from(price),
        slug: "coffee".into(),
        category_id: 1,
        active: true,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn ana_with_password(password: &str) -> ClientCredentials {
    ana_with_hashed_password(password, 4)
}

fn ana_with_hashed_password(password: &str, cost: u32) -> ClientCredentials {
    let hash = PasswordPolicy::new(cost).unwrap().hash(password).unwrap();
    ClientCredentials {
        id: 1,
        national_document: "1001".into(),
        name: "Ana".into(),
        lastname: "Rojas".into(),
        password_hash: hash,
    }
}

#[actix_web::test]
async fn login() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    let creds = ana_with_password("s3cret");
    backend
        .expect_fetch_client_credentials()
        .withf(|doc| doc == "1001")
        .times(1)
        .returning(move |_| Ok(Some(creds.clone())));
    let api = login_api(backend);
    let login = json!({"national_document": "1001", "password": "s3cret"});
    let req = TestRequest::post().uri("/users/login").set_json(login);
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(LoginRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"id":1,"national_document":"1001","name":"Ana","lastname":"Rojas"}"#);
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    let creds = ana_with_password("s3cret");
    backend.expect_fetch_client_credentials().returning(move |_| Ok(Some(creds.clone())));
    let api = login_api(backend);
    let login = json!({"national_document": "1001", "password": "guess"});
    let req = TestRequest::post().uri("/users/login").set_json(login);
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(LoginRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Invalid credentials","kind":"unauthorized"}"#);
}

#[actix_web::test]
async fn login_with_missing_fields() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_client_credentials().never();
    let api = login_api(backend);
    let login = json!({"national_document": "", "password": ""});
    let req = TestRequest::post().uri("/users/login").set_json(login);
    let (status, _) = send_request(req, move |cfg| {
        cfg.app_data(api).service(LoginRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn failed_login_time(api: web::Data<ClientApi<MockBackend>>, document: &str) -> Duration {
    let login = json!({"national_document": document, "password": "guess"});
    let req = TestRequest::post().uri("/users/login").set_json(login);
    let start = Instant::now();
    let (status, _) = send_request(req, move |cfg| {
        cfg.app_data(api).service(LoginRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    let elapsed = start.elapsed();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    elapsed
}

#[actix_web::test]
async fn unknown_document_login_is_as_slow_as_a_wrong_password() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    let creds = ana_with_hashed_password("s3cret", 8);
    backend
        .expect_fetch_client_credentials()
        .returning(move |doc| Ok((doc == "1001").then(|| creds.clone())));
    let api = login_api_with_cost(backend, 8);
    let mut wrong_password = Duration::MAX;
    let mut unknown_document = Duration::MAX;
    for _ in 0..3 {
        wrong_password = wrong_password.min(failed_login_time(api.clone(), "1001").await);
        unknown_document = unknown_document.min(failed_login_time(api.clone(), "9999").await);
    }
    assert!(
        unknown_document * 4 >= wrong_password,
        "Unknown document took {unknown_document:?}, wrong password took {wrong_password:?}"
    );
}

#[actix_web::test]
async fn get_product() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_product().with(eq(3)).times(1).returning(|id| Ok(Some(coffee(id, 10))));
    let api = web::Data::new(CatalogApi::new(backend));
    let (status, body) = send_request(TestRequest::get().uri("/products/3"), move |cfg| {
        cfg.app_data(api).service(GetProductRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["id"], 3);
    assert_eq!(product["price"], 10);
}

#[actix_web::test]
async fn get_missing_product() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_product().returning(|_| Ok(None));
    let api = web::Data::new(CatalogApi::new(backend));
    let (status, body) = send_request(TestRequest::get().uri("/products/99"), move |cfg| {
        cfg.app_data(api).service(GetProductRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Product #99 does not exist","kind":"not_found"}"#);
}

#[actix_web::test]
async fn update_product_requires_admin() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_update_product().never();
    let api = web::Data::new(CatalogApi::new(backend));
    let req = TestRequest::put().uri("/products/3").set_json(json!({"price": 12}));
    let err = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateProductRoute::<MockBackend>::new());
    })
    .await
    .expect_err("Expected error");
    assert_eq!(err.to_string(), "Insufficient Permissions. Required roles: admin");
}

#[actix_web::test]
async fn update_product() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_update_product()
        .withf(|id, patch| *id == 3 && patch.price == Some(Money::from(12)) && patch.name.is_none())
        .times(1)
        .returning(|id, patch| Ok(coffee(id, patch.price.map(|p| p.value()).unwrap_or_default())));
    let api = web::Data::new(CatalogApi::new(backend));
    let req = with_admin_key(TestRequest::put().uri("/products/3")).set_json(json!({"price": 12}));
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateProductRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["price"], 12);
    assert_eq!(product["sku"], "COF-001");
}

#[actix_web::test]
async fn update_product_with_unknown_field() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_update_product().never();
    let api = web::Data::new(CatalogApi::new(backend));
    let req = with_admin_key(TestRequest::put().uri("/products/3")).set_json(json!({"stock": 12}));
    let (status, body) = send_request(req, move |cfg| {
        cfg.app_data(api).service(UpdateProductRoute::<MockBackend>::new());
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "validation");
}
