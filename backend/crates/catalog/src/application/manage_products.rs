//! Manage Products Use Case

use kernel::id::ProductId;
use kernel::pagination::Page;
use std::sync::Arc;

use crate::application::broadcast::ProductBroadcaster;
use crate::domain::entity::{Product, ProductDraft};
use crate::domain::repository::ProductRepository;
use crate::domain::value_object::ProductQuery;
use crate::error::{CatalogError, CatalogResult};

/// Product CRUD. Every successful write is followed by a broadcast of the
/// full product list.
pub struct ManageProductsUseCase<P>
where
    P: ProductRepository,
{
    product_repo: Arc<P>,
    broadcaster: Arc<dyn ProductBroadcaster>,
}

impl<P> ManageProductsUseCase<P>
where
    P: ProductRepository,
{
    pub fn new(product_repo: Arc<P>, broadcaster: Arc<dyn ProductBroadcaster>) -> Self {
        Self {
            product_repo,
            broadcaster,
        }
    }

    pub async fn list(&self, query: &ProductQuery) -> CatalogResult<Page<Product>> {
        self.product_repo.find_page(query).await
    }

    pub async fn list_all(&self) -> CatalogResult<Vec<Product>> {
        self.product_repo.find_all().await
    }

    pub async fn get(&self, id: &ProductId) -> CatalogResult<Product> {
        self.product_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    pub async fn create(&self, draft: ProductDraft) -> CatalogResult<Product> {
        let new_product = draft.into_new_product()?;

        if self
            .product_repo
            .code_exists(&new_product.code, None)
            .await?
        {
            return Err(CatalogError::DuplicateCode(new_product.code.to_string()));
        }

        let product = self.product_repo.create(new_product).await?;
        tracing::info!(product_id = %product.id, code = %product.code, "Product created");

        self.broadcast().await;
        Ok(product)
    }

    pub async fn update(&self, id: &ProductId, draft: ProductDraft) -> CatalogResult<Product> {
        let patch = draft.into_patch()?;

        if self.product_repo.find_by_id(id).await?.is_none() {
            return Err(CatalogError::ProductNotFound);
        }

        if let Some(code) = &patch.code {
            if self.product_repo.code_exists(code, Some(id)).await? {
                return Err(CatalogError::DuplicateCode(code.to_string()));
            }
        }

        let product = self
            .product_repo
            .update(id, patch)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;
        tracing::info!(product_id = %id, "Product updated");

        self.broadcast().await;
        Ok(product)
    }

    pub async fn delete(&self, id: &ProductId) -> CatalogResult<()> {
        if !self.product_repo.delete(id).await? {
            return Err(CatalogError::ProductNotFound);
        }
        tracing::info!(product_id = %id, "Product deleted");

        self.broadcast().await;
        Ok(())
    }

    /// Re-read the full list and hand it to the broadcaster.
    /// A failed re-read is logged; the write itself already succeeded.
    async fn broadcast(&self) {
        let _order = self.broadcaster.publish_order().lock().await;
        match self.product_repo.find_all().await {
            Ok(products) => self.broadcaster.products_changed(products),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping product broadcast: re-read failed");
            }
        }
    }
}
