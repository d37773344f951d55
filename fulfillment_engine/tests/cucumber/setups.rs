use cucumber::given;

use crate::cucumber::{world::FulfillmentSystem, FulfillmentWorld};

#[given("a fresh install with the test catalog")]
async fn fresh_database(world: &mut FulfillmentWorld) {
    let system = FulfillmentSystem::new().await;
    world.system = Some(system);
}
