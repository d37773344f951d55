use crate::{
    db_types::{Client, ClientCredentials, PaymentMethod, Product, ProductStock},
    order_objects::ProductPatch,
    traits::FulfillmentError,
};

/// The `CatalogLookup` trait defines the collaborator queries the fulfillment pipeline relies on. These are simple,
/// single-table reads (plus product patching) over data that is owned by the client and catalog services.
#[allow(async_fn_in_trait)]
pub trait CatalogLookup {
    /// Fetches the client with the given id. If no client exists, `None` is returned.
    async fn fetch_client(&self, client_id: i64) -> Result<Option<Client>, FulfillmentError>;

    /// Fetches the catalog record for a product, whether or not it is active.
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, FulfillmentError>;

    /// Fetches a product along with the quantity in stock at the given location.
    ///
    /// If the product exists but has no inventory record at the location, the quantity is reported as zero.
    /// `None` is returned only if the product itself does not exist.
    async fn fetch_product_with_stock(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> Result<Option<ProductStock>, FulfillmentError>;

    /// Returns true if the payment method has been registered for use by the client.
    async fn is_payment_method_linked(&self, client_id: i64, payment_method_id: i64) -> Result<bool, FulfillmentError>;

    /// Resolves a payment method from its label. Labels are matched case-insensitively.
    async fn fetch_payment_method_by_label(&self, label: &str) -> Result<Option<PaymentMethod>, FulfillmentError>;

    /// Fetches the stored credentials for the client holding the given national document.
    async fn fetch_client_credentials(
        &self,
        national_document: &str,
    ) -> Result<Option<ClientCredentials>, FulfillmentError>;

    /// Applies a validated patch to a product and returns the updated record.
    ///
    /// Existing order lines keep the price they were created with.
    async fn update_product(&self, product_id: i64, patch: ProductPatch) -> Result<Product, FulfillmentError>;
}
