//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer
//! (flat JSON files and PostgreSQL).

use kernel::id::{CartId, ProductId};
use kernel::pagination::Page;

use crate::domain::entity::{Cart, LineItem, NewProduct, Product, ProductPatch};
use crate::domain::value_object::{ProductCode, ProductQuery, Quantity};
use crate::error::CatalogResult;

/// Product repository trait
#[trait_variant::make(ProductRepository: Send)]
pub trait LocalProductRepository {
    /// Filtered, sorted, paginated listing
    async fn find_page(&self, query: &ProductQuery) -> CatalogResult<Page<Product>>;

    /// Every product in storage order
    async fn find_all(&self) -> CatalogResult<Vec<Product>>;

    async fn find_by_id(&self, id: &ProductId) -> CatalogResult<Option<Product>>;

    /// Products among `ids` that exist; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>>;

    /// Whether another product (other than `except`) already uses `code`
    async fn code_exists(&self, code: &ProductCode, except: Option<&ProductId>)
    -> CatalogResult<bool>;

    /// Persist a new product and assign its id.
    /// Fails with `DuplicateCode` if the code is taken.
    async fn create(&self, product: NewProduct) -> CatalogResult<Product>;

    /// Apply a partial update. Returns `None` if the product does not exist.
    async fn update(&self, id: &ProductId, patch: ProductPatch)
    -> CatalogResult<Option<Product>>;

    /// Returns `false` if nothing was deleted
    async fn delete(&self, id: &ProductId) -> CatalogResult<bool>;
}

/// Cart repository trait
///
/// Every mutation returns the updated cart, or `None` if the cart does not
/// exist. Product existence is checked by the caller.
#[trait_variant::make(CartRepository: Send)]
pub trait LocalCartRepository {
    async fn create(&self) -> CatalogResult<Cart>;

    async fn find_by_id(&self, id: &CartId) -> CatalogResult<Option<Cart>>;

    /// Insert the line item or increment its quantity
    async fn add_item(
        &self,
        id: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<Option<Cart>>;

    /// Fails with `ItemNotInCart` if the product is not in the cart
    async fn set_item_quantity(
        &self,
        id: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<Option<Cart>>;

    /// Fails with `ItemNotInCart` if the product is not in the cart
    async fn remove_item(&self, id: &CartId, product: &ProductId) -> CatalogResult<Option<Cart>>;

    /// Replace every line item; `items` is already merged
    async fn replace_items(&self, id: &CartId, items: Vec<LineItem>)
    -> CatalogResult<Option<Cart>>;

    async fn clear(&self, id: &CartId) -> CatalogResult<Option<Cart>>;
}
