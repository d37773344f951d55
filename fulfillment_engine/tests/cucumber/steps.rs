use cucumber::{then, when};
use fulfillment_engine::{
    db_types::{Money, PaymentStatus},
    order_objects::{NewOrderRequest, NewPayment, StatusOverride},
    test_utils::fixtures::{row_count, stock_level},
    FulfillmentDatabase,
};

use crate::cucumber::FulfillmentWorld;

async fn place_order(world: &mut FulfillmentWorld, client: &str, items: &[(i64, &str)], location: &str, method: &str) {
    let sys = world.system();
    let mut request = NewOrderRequest::new(sys.client(client), sys.location(location), sys.payment_method(method));
    for (qty, product) in items {
        request = request.with_item(sys.product(product), *qty);
    }
    let result = world.api().create_order(request).await;
    if let Some(order) = world.record(result) {
        world.last_order = Some(order);
    }
}

#[when(expr = "{word} orders {int} {word} at {word} paying by {word}")]
async fn order_one(world: &mut FulfillmentWorld, client: String, qty: i64, product: String, loc: String, pm: String) {
    place_order(world, &client, &[(qty, &product)], &loc, &pm).await;
}

#[when(expr = "{word} orders {int} {word} and {int} {word} at {word} paying by {word}")]
async fn order_two(
    world: &mut FulfillmentWorld,
    client: String,
    qty1: i64,
    product1: String,
    qty2: i64,
    product2: String,
    location: String,
    method: String,
) {
    place_order(world, &client, &[(qty1, &product1), (qty2, &product2)], &location, &method).await;
}

#[when(expr = "a payment of {int} is made for the order using {string}")]
async fn pay_order(world: &mut FulfillmentWorld, amount: i64, method: String) {
    let payment = NewPayment::new(world.order_id(), Money::from(amount), method);
    let result = world.api().record_payment(payment).await;
    if let Some(payment) = world.record(result) {
        world.last_payment = Some(payment);
    }
}

#[when(expr = "an admin sets the order status to {string}")]
async fn set_status(world: &mut FulfillmentWorld, status: String) {
    let result = world.api().update_order_status(world.order_id(), StatusOverride::new(status)).await;
    world.record(result);
}

#[when(expr = "an admin forces the order status to {string}")]
async fn force_status(world: &mut FulfillmentWorld, status: String) {
    let change = StatusOverride::new(status).with_reason("manual correction").forced();
    let result = world.api().update_order_status(world.order_id(), change).await;
    world.record(result);
}

#[when("I read the order")]
async fn read_order(world: &mut FulfillmentWorld) {
    let detail = world.api().get_order(world.order_id()).await.expect("Error fetching order");
    world.snapshot = Some(detail);
}

#[then(expr = "the order total is {int}")]
async fn order_total(world: &mut FulfillmentWorld, total: i64) {
    let order = world.last_order.as_ref().expect("No order has been created");
    assert_eq!(order.total_amount, Money::from(total));
}

#[then(expr = "the stock of {word} at {word} is {int}")]
async fn check_stock(world: &mut FulfillmentWorld, product: String, location: String, expected: i64) {
    let sys = world.system();
    let qty = stock_level(sys.api.db(), sys.product(&product), sys.location(&location)).await;
    assert_eq!(qty, expected);
}

#[then(expr = "the payment status of the order is {word}")]
async fn check_status(world: &mut FulfillmentWorld, status: String) {
    let expected = status.parse::<PaymentStatus>().expect("Not a payment status");
    let entry = world.api().db().fetch_ledger_entry(world.order_id()).await.expect("Error fetching ledger");
    assert_eq!(entry.expect("Ledger entry should exist").status, expected);
}

#[then("the stored lines of the order add up to the ledger total")]
async fn totals_agree(world: &mut FulfillmentWorld) {
    let detail = world.api().get_order(world.order_id()).await.expect("Error fetching order");
    assert_eq!(detail.payment.total_amount, detail.payment.calculated_total);
}

#[then(expr = "the request fails with {word}")]
async fn request_fails(world: &mut FulfillmentWorld, variant: String) {
    let err = world.last_error.as_ref().expect("The last request should have failed");
    let name = format!("{err:?}");
    assert!(name.starts_with(&variant), "Expected {variant}, but got {name}");
}

#[then("the request succeeds")]
async fn request_succeeds(world: &mut FulfillmentWorld) {
    assert!(world.last_error.is_none(), "Unexpected error: {:?}", world.last_error);
}

#[then(expr = "there are {int} orders, {int} order lines and {int} ledger entries")]
async fn table_counts(world: &mut FulfillmentWorld, orders: i64, lines: i64, entries: i64) {
    let db = world.api().db();
    assert_eq!(row_count(db, "orders").await, orders);
    assert_eq!(row_count(db, "order_lines").await, lines);
    assert_eq!(row_count(db, "payment_ledger").await, entries);
}

#[then(expr = "{word} has {int} payment receipt(s)")]
async fn receipt_count(world: &mut FulfillmentWorld, client: String, count: usize) {
    let client_id = world.system().client(&client);
    let receipts = world.api().db().fetch_receipts_for_client(client_id).await.expect("Error fetching receipts");
    assert_eq!(receipts.len(), count);
}

#[then(expr = "the status audit trail has {int} entr(y)(ies)")]
async fn audit_count(world: &mut FulfillmentWorld, count: usize) {
    let trail = world.api().db().fetch_status_audit(world.order_id()).await.expect("Error fetching audit trail");
    assert_eq!(trail.len(), count);
}

#[then("reading the order again gives the same result")]
async fn idempotent_read(world: &mut FulfillmentWorld) {
    let again = world.api().get_order(world.order_id()).await.expect("Error fetching order");
    assert_eq!(world.snapshot.as_ref(), Some(&again));
}
