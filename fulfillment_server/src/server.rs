use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpResponse, HttpServer};
use fulfillment_engine::{CatalogApi, ClientApi, OrderFlowApi, PasswordPolicy, SqliteDatabase};
use log::*;

use crate::{
    config::ServerConfig,
    data_objects::JsonResponse,
    errors::ServerError,
    routes::{
        health,
        CreateOrderRoute,
        GetOrderRoute,
        GetProductRoute,
        ListOrdersRoute,
        ListPaymentsRoute,
        LoginRoute,
        RecordPaymentRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        info!("🗃️ Running database migrations");
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let policy = PasswordPolicy::new(config.bcrypt_cost).map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    let clients_api = ClientApi::new(db.clone(), policy).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let clients_api = web::Data::new(clients_api);
    let access_keys = web::Data::new(config.access_keys.clone());
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(ListOrdersRoute::<SqliteDatabase>::new())
            .service(GetOrderRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(RecordPaymentRoute::<SqliteDatabase>::new())
            .service(ListPaymentsRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(GetProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ofp::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(clients_api.clone())
            .app_data(web::Data::new(catalog_api))
            .app_data(access_keys.clone())
            .app_data(json_config())
            .service(health)
            .service(api_scope)
            .default_service(web::to(|| async { HttpResponse::NotFound().json(JsonResponse::failure("Not found")) }))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies are reported with the same error envelope as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Could not deserialize request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}
