use crate::{
    db_types::{Money, PaymentStatus, SequenceKind},
    sqlite::db::{clients, inventory, ledger, orders, payment_methods, products, products::NewProduct, sequences},
    PasswordPolicy,
    SqliteDatabase,
};

pub const ANA_DOCUMENT: &str = "1001";
pub const ANA_PASSWORD: &str = "ana-password";
pub const BRUNO_DOCUMENT: &str = "1002";
pub const BRUNO_PASSWORD: &str = "bruno-password";

/// Ids of the records created by [`seed_catalog`].
///
/// * Ana can pay by `Card` or `Cash`. Bruno can only pay by `Transfer`.
/// * Coffee (10) and filters (5) are active. The mug (7) is inactive.
/// * Downtown stocks 10 coffee, 5 filters and 4 mugs. The airport stocks 1 coffee and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixtures {
    pub ana: i64,
    pub bruno: i64,
    pub downtown: i64,
    pub airport: i64,
    pub coffee: i64,
    pub filters: i64,
    pub mug: i64,
    pub card: i64,
    pub cash: i64,
    pub transfer: i64,
}

/// The cheapest hashing policy bcrypt allows. Only suitable for tests.
pub fn test_password_policy() -> PasswordPolicy {
    PasswordPolicy::new(4).expect("4 is a valid bcrypt cost")
}

fn product(sku: &str, name: &str, price: i64, active: bool) -> NewProduct {
    NewProduct {
        sku: sku.to_string(),
        name: name.to_string(),
        description: format!("{name} for testing"),
        price: Money::from(price),
        slug: name.to_lowercase().replace(' ', "-"),
        category_id: 1,
        active,
    }
}

/// Loads a small catalog into an empty, migrated database.
pub async fn seed_catalog(db: &SqliteDatabase) -> Fixtures {
    let policy = test_password_policy();
    let mut tx = db.pool().begin().await.expect("Could not start fixture transaction");
    let ana_hash = policy.hash(ANA_PASSWORD).expect("Hashing failed");
    let bruno_hash = policy.hash(BRUNO_PASSWORD).expect("Hashing failed");
    let ana = clients::insert_client(ANA_DOCUMENT, "Ana", "Diaz", &ana_hash, &mut tx).await.expect("insert ana").id;
    let bruno =
        clients::insert_client(BRUNO_DOCUMENT, "Bruno", "Soto", &bruno_hash, &mut tx).await.expect("insert bruno").id;
    let downtown = clients::insert_location("Downtown", &mut tx).await.expect("insert downtown").id;
    let airport = clients::insert_location("Airport", &mut tx).await.expect("insert airport").id;
    let coffee =
        products::insert_product(product("SKU-001", "Coffee Beans", 10, true), &mut tx).await.expect("coffee").id;
    let filters =
        products::insert_product(product("SKU-002", "Paper Filters", 5, true), &mut tx).await.expect("filters").id;
    let mug = products::insert_product(product("SKU-003", "Retired Mug", 7, false), &mut tx).await.expect("mug").id;
    for (p, l, q) in [(coffee, downtown, 10), (filters, downtown, 5), (mug, downtown, 4), (coffee, airport, 1)] {
        inventory::set_stock_level(p, l, q, &mut tx).await.expect("Could not set stock level");
    }
    let card = payment_methods::insert_method("Card", &mut tx).await.expect("card").id;
    let cash = payment_methods::insert_method("Cash", &mut tx).await.expect("cash").id;
    let transfer = payment_methods::insert_method("Transfer", &mut tx).await.expect("transfer").id;
    for (c, m) in [(ana, card), (ana, cash), (bruno, transfer)] {
        payment_methods::link_to_client(c, m, &mut tx).await.expect("Could not link payment method");
    }
    tx.commit().await.expect("Could not commit fixtures");
    Fixtures { ana, bruno, downtown, airport, coffee, filters, mug, card, cash, transfer }
}

/// Inserts a raw order, bypassing stock checks, so that tests can set up awkward states. The ids still come from the
/// allocator.
pub async fn seed_order_row(db: &SqliteDatabase, client_id: i64, location_id: i64) -> i64 {
    let mut tx = db.pool().begin().await.expect("Could not start transaction");
    let id = sequences::next_id(SequenceKind::Orders, &mut tx).await.expect("Could not allocate order id");
    orders::insert_order(id, client_id, location_id, &mut tx).await.expect("insert order");
    tx.commit().await.expect("commit");
    id
}

/// Current stock level for a product at a location.
pub async fn stock_level(db: &SqliteDatabase, product_id: i64, location_id: i64) -> i64 {
    let mut conn = db.pool().acquire().await.expect("Could not acquire connection");
    inventory::stock_level(product_id, location_id, &mut conn).await.expect("Could not read stock level")
}

/// Number of rows in `table`. Only for use with the fixed table names in this crate.
pub async fn row_count(db: &SqliteDatabase, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    sqlx::query_scalar(&sql).fetch_one(db.pool()).await.expect("Could not count rows")
}

/// Sets an order's ledger status directly, skipping the audit trail.
pub async fn force_ledger_status(db: &SqliteDatabase, order_id: i64, status: PaymentStatus) {
    let mut conn = db.pool().acquire().await.expect("Could not acquire connection");
    ledger::set_status(order_id, status, &mut conn).await.expect("Could not set status");
}
