//! HTTP handlers for the fulfillment server
//!
//! Handlers stay thin: they unpack the request, call into the engine APIs and wrap the result. Anything longer belongs
//! in `fulfillment_engine`.
//!
//! Every handler runs on an actix worker thread. Database calls are awaited, and password hashing is handed to the
//! blocking pool by [`ClientApi`], so no handler holds its worker while waiting.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use fulfillment_engine::{
    order_objects::{LoginRequest, NewOrderRequest, NewPayment, ProductPatch, StatusOverride},
    traits::{CatalogLookup, FulfillmentDatabase},
    CatalogApi,
    ClientApi,
    OrderFlowApi,
};
use log::*;

use crate::{
    auth::{Role, OPERATOR_HEADER},
    data_objects::{JsonResponse, OrderList, PaymentList, PaymentResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $bound:path) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $bound + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $bound:path where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $bound + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl FulfillmentDatabase);
/// Route handler for placing a new order
///
/// The request is validated against the catalog and the client's payment methods, and then persisted in a single
/// transaction that reserves stock and opens a `PENDING` payment ledger entry. On success, the new order id, the total
/// and the priced line items are returned with a `201 Created` status.
pub async fn create_order<B: FulfillmentDatabase>(
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST new order for client #{} at location #{}", request.client_id, request.location_id);
    let order = api.create_order(request).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(list_orders => Get "/orders" impl FulfillmentDatabase);
pub async fn list_orders<B: FulfillmentDatabase>(api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all orders");
    let orders = api.list_orders().await?;
    Ok(HttpResponse::Ok().json(OrderList { orders }))
}

route!(get_order => Get "/orders/{order_id}" impl FulfillmentDatabase);
pub async fn get_order<B: FulfillmentDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id}");
    let order = api.get_order(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Put "/orders/{order_id}" impl FulfillmentDatabase where requires [Role::Admin]);
/// Route handler for the administrative payment status override
///
/// Admin users can set the payment status of any order to `PAID`, `PENDING` or `FAILED`. The operator named in the
/// `ofp_operator` header is recorded in the audit trail. Orders that are already `PAID` can only be moved if the
/// request sets `force`.
pub async fn update_order_status<B: FulfillmentDatabase>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<StatusOverride>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let mut request = body.into_inner();
    if let Some(operator) = req.headers().get(OPERATOR_HEADER).and_then(|v| v.to_str().ok()) {
        request.actor = operator.to_string();
    }
    debug!("💻️ PUT status {} for order #{order_id} by {}", request.status, request.actor);
    let change = api.update_order_status(order_id, request).await?;
    let message =
        format!("Order #{order_id} payment status changed from {} to {}", change.old_status, change.new_status);
    Ok(HttpResponse::Ok().json(JsonResponse::success(message)))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(record_payment => Post "/payments" impl FulfillmentDatabase);
/// Route handler for recording a payment against an order
///
/// The amount must match the order total exactly, and the payment method must be linked to the client who placed the
/// order. Each order can be paid at most once.
pub async fn record_payment<B: FulfillmentDatabase>(
    body: web::Json<NewPayment>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let payment = body.into_inner();
    debug!("💻️ POST payment of {} for order #{} via {}", payment.amount, payment.order_id, payment.method);
    let recorded = api.record_payment(payment).await?;
    Ok(HttpResponse::Created().json(PaymentResponse::from(recorded)))
}

route!(list_payments => Get "/payments" impl FulfillmentDatabase);
pub async fn list_payments<B: FulfillmentDatabase>(
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all payments");
    let payments = api.list_payments().await?;
    Ok(HttpResponse::Ok().json(PaymentList { payments }))
}

//----------------------------------------------   Clients  ----------------------------------------------------
route!(login => Post "/users/login" impl CatalogLookup);
pub async fn login<B: CatalogLookup>(
    body: web::Json<LoginRequest>,
    api: web::Data<ClientApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST login for {request:?}");
    let client = api.login(&request.national_document, &request.password).await?;
    Ok(HttpResponse::Ok().json(client))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(get_product => Get "/products/{product_id}" impl CatalogLookup);
pub async fn get_product<B: CatalogLookup>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ GET product #{product_id}");
    let product = api.get_product(product_id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(update_product => Put "/products/{product_id}" impl CatalogLookup where requires [Role::Admin]);
pub async fn update_product<B: CatalogLookup>(
    path: web::Path<i64>,
    body: web::Json<ProductPatch>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ PUT product #{product_id}");
    let product = api.update_product(product_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}
