//! Manage Carts Use Case

use kernel::id::{CartId, ProductId};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::entity::cart::merge_line_items;
use crate::domain::entity::{Cart, CartDetail, LineItem};
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::value_object::Quantity;
use crate::error::{CatalogError, CatalogResult};

/// Cart lifecycle and line-item edits.
///
/// Mutations return the populated cart so callers can render totals
/// without a second round trip.
pub struct ManageCartsUseCase<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    cart_repo: Arc<C>,
    product_repo: Arc<P>,
}

impl<C, P> ManageCartsUseCase<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    pub fn new(cart_repo: Arc<C>, product_repo: Arc<P>) -> Self {
        Self {
            cart_repo,
            product_repo,
        }
    }

    pub async fn create(&self) -> CatalogResult<Cart> {
        let cart = self.cart_repo.create().await?;
        tracing::info!(cart_id = %cart.id, "Cart created");
        Ok(cart)
    }

    pub async fn get(&self, id: &CartId) -> CatalogResult<Cart> {
        self.cart_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::CartNotFound)
    }

    /// Cart with each line item joined to its product and the total
    pub async fn detail(&self, id: &CartId) -> CatalogResult<CartDetail> {
        let cart = self.get(id).await?;
        self.populate(cart).await
    }

    pub async fn add_product(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<CartDetail> {
        self.get(cart_id).await?;
        self.require_product(product_id).await?;

        let cart = self
            .cart_repo
            .add_item(cart_id, product_id, quantity)
            .await?
            .ok_or(CatalogError::CartNotFound)?;
        tracing::debug!(cart_id = %cart_id, product_id = %product_id, quantity = %quantity, "Added to cart");

        self.populate(cart).await
    }

    pub async fn set_quantity(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<CartDetail> {
        let cart = self
            .cart_repo
            .set_item_quantity(cart_id, product_id, quantity)
            .await?
            .ok_or(CatalogError::CartNotFound)?;

        self.populate(cart).await
    }

    pub async fn remove_product(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
    ) -> CatalogResult<CartDetail> {
        let cart = self
            .cart_repo
            .remove_item(cart_id, product_id)
            .await?
            .ok_or(CatalogError::CartNotFound)?;

        self.populate(cart).await
    }

    /// Replace every line item. All referenced products must exist.
    pub async fn replace_products(
        &self,
        cart_id: &CartId,
        items: Vec<LineItem>,
    ) -> CatalogResult<CartDetail> {
        self.get(cart_id).await?;

        let items = merge_line_items(items);
        let ids: Vec<ProductId> = items.iter().map(|item| item.product).collect();
        let found = self.product_repo.find_by_ids(&ids).await?;
        let found: HashSet<ProductId> = found.into_iter().map(|p| p.id).collect();

        if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
            tracing::debug!(product_id = %missing, "Replace references unknown product");
            return Err(CatalogError::ProductNotFound);
        }

        let cart = self
            .cart_repo
            .replace_items(cart_id, items)
            .await?
            .ok_or(CatalogError::CartNotFound)?;

        self.populate(cart).await
    }

    pub async fn clear(&self, cart_id: &CartId) -> CatalogResult<CartDetail> {
        let cart = self
            .cart_repo
            .clear(cart_id)
            .await?
            .ok_or(CatalogError::CartNotFound)?;

        self.populate(cart).await
    }

    async fn require_product(&self, id: &ProductId) -> CatalogResult<()> {
        match self.product_repo.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::ProductNotFound),
        }
    }

    async fn populate(&self, cart: Cart) -> CatalogResult<CartDetail> {
        let ids: Vec<ProductId> = cart.products.iter().map(|item| item.product).collect();
        let products = if ids.is_empty() {
            Vec::new()
        } else {
            self.product_repo.find_by_ids(&ids).await?
        };
        Ok(CartDetail::populate(cart, &products))
    }
}
