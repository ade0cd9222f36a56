//! Flat-file Repository Implementation
//!
//! One JSON array file per resource. Every write re-reads the whole file,
//! applies the change in memory and writes the whole file back. Concurrent
//! writers can lose updates.

use kernel::id::{CartId, Id, ProductId};
use kernel::pagination::Page;
use platform::json_file::JsonArrayFile;
use std::path::Path;

use crate::domain::entity::{Cart, LineItem, NewProduct, Product, ProductPatch};
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::value_object::{ProductCode, ProductQuery, Quantity};
use crate::error::{CatalogError, CatalogResult};

pub const PRODUCTS_FILE: &str = "products.json";
pub const CARTS_FILE: &str = "carts.json";

/// Next sequential id: one past the largest existing integer id
fn next_seq<T>(ids: impl Iterator<Item = Id<T>>) -> u64 {
    ids.filter_map(|id| id.as_seq()).max().unwrap_or(0) + 1
}

/// Products stored in a JSON array file
#[derive(Debug, Clone)]
pub struct FileProductRepository {
    file: JsonArrayFile,
}

impl FileProductRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonArrayFile::new(path.as_ref()),
        }
    }

    /// `products.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(PRODUCTS_FILE))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn load(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.file.read_all().await?)
    }

    async fn save(&self, products: &[Product]) -> CatalogResult<()> {
        Ok(self.file.write_all(products).await?)
    }
}

impl ProductRepository for FileProductRepository {
    async fn find_page(&self, query: &ProductQuery) -> CatalogResult<Page<Product>> {
        let mut products: Vec<Product> = self
            .load()
            .await?
            .into_iter()
            .filter(|p| query.filter.matches(p))
            .collect();

        if let Some(sort) = query.sort {
            products.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(Page::from_vec(products, query.page))
    }

    async fn find_all(&self) -> CatalogResult<Vec<Product>> {
        self.load().await
    }

    async fn find_by_id(&self, id: &ProductId) -> CatalogResult<Option<Product>> {
        Ok(self.load().await?.into_iter().find(|p| &p.id == id))
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|p| ids.contains(&p.id))
            .collect())
    }

    async fn code_exists(
        &self,
        code: &ProductCode,
        except: Option<&ProductId>,
    ) -> CatalogResult<bool> {
        Ok(self
            .load()
            .await?
            .iter()
            .any(|p| &p.code == code && Some(&p.id) != except))
    }

    async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
        let mut products = self.load().await?;

        if products.iter().any(|p| p.code == product.code) {
            return Err(CatalogError::DuplicateCode(product.code.to_string()));
        }

        let id = ProductId::from_seq(next_seq(products.iter().map(|p| p.id)));
        let product = product.into_product(id, None);
        products.push(product.clone());
        self.save(&products).await?;

        Ok(product)
    }

    async fn update(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> CatalogResult<Option<Product>> {
        let mut products = self.load().await?;

        if let Some(code) = &patch.code {
            if products.iter().any(|p| &p.code == code && &p.id != id) {
                return Err(CatalogError::DuplicateCode(code.to_string()));
            }
        }

        let Some(product) = products.iter_mut().find(|p| &p.id == id) else {
            return Ok(None);
        };
        patch.apply(product);
        let updated = product.clone();
        self.save(&products).await?;

        Ok(Some(updated))
    }

    async fn delete(&self, id: &ProductId) -> CatalogResult<bool> {
        let mut products = self.load().await?;
        let before = products.len();
        products.retain(|p| &p.id != id);

        if products.len() == before {
            return Ok(false);
        }

        self.save(&products).await?;
        Ok(true)
    }
}

/// Carts stored in a JSON array file
#[derive(Debug, Clone)]
pub struct FileCartRepository {
    file: JsonArrayFile,
}

impl FileCartRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonArrayFile::new(path.as_ref()),
        }
    }

    /// `carts.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CARTS_FILE))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn load(&self) -> CatalogResult<Vec<Cart>> {
        Ok(self.file.read_all().await?)
    }

    async fn save(&self, carts: &[Cart]) -> CatalogResult<()> {
        Ok(self.file.write_all(carts).await?)
    }

    /// Read-modify-write of a single cart
    async fn mutate<F>(&self, id: &CartId, f: F) -> CatalogResult<Option<Cart>>
    where
        F: FnOnce(&mut Cart) -> CatalogResult<()>,
    {
        let mut carts = self.load().await?;
        let Some(cart) = carts.iter_mut().find(|c| &c.id == id) else {
            return Ok(None);
        };
        f(cart)?;
        let updated = cart.clone();
        self.save(&carts).await?;

        Ok(Some(updated))
    }
}

impl CartRepository for FileCartRepository {
    async fn create(&self) -> CatalogResult<Cart> {
        let mut carts = self.load().await?;
        let id = CartId::from_seq(next_seq(carts.iter().map(|c| c.id)));
        let cart = Cart::new(id);
        carts.push(cart.clone());
        self.save(&carts).await?;

        Ok(cart)
    }

    async fn find_by_id(&self, id: &CartId) -> CatalogResult<Option<Cart>> {
        Ok(self.load().await?.into_iter().find(|c| &c.id == id))
    }

    async fn add_item(
        &self,
        id: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<Option<Cart>> {
        self.mutate(id, |cart| {
            cart.add_product(*product, quantity);
            Ok(())
        })
        .await
    }

    async fn set_item_quantity(
        &self,
        id: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<Option<Cart>> {
        self.mutate(id, |cart| cart.set_quantity(product, quantity))
            .await
    }

    async fn remove_item(&self, id: &CartId, product: &ProductId) -> CatalogResult<Option<Cart>> {
        self.mutate(id, |cart| cart.remove_product(product)).await
    }

    async fn replace_items(
        &self,
        id: &CartId,
        items: Vec<LineItem>,
    ) -> CatalogResult<Option<Cart>> {
        self.mutate(id, |cart| {
            cart.replace_products(items);
            Ok(())
        })
        .await
    }

    async fn clear(&self, id: &CartId) -> CatalogResult<Option<Cart>> {
        self.mutate(id, |cart| {
            cart.clear();
            Ok(())
        })
        .await
    }
}
