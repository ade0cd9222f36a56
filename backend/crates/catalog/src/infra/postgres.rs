//! PostgreSQL Repository Implementations
//!
//! Products and carts keyed by UUID. Ids of the other flavour can never
//! match a row and are reported as not found.

use chrono::{DateTime, Utc};
use kernel::id::{CartId, ProductId};
use kernel::pagination::Page;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Cart, LineItem, NewProduct, Product, ProductPatch};
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::value_object::{CartStatus, Category, ProductCode, ProductQuery, Quantity};
use crate::error::{CatalogError, CatalogResult};

const UNIQUE_VIOLATION: &str = "23505";

const PRODUCT_COLUMNS: &str = r#"
    product_id,
    title,
    description,
    price,
    code,
    stock,
    category,
    status,
    thumbnails,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed product and cart repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bump `updated_at`; `false` if the cart does not exist
    async fn touch_cart(&self, cart_id: Uuid) -> CatalogResult<bool> {
        let touched = sqlx::query("UPDATE carts SET updated_at = NOW() WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(touched > 0)
    }

    async fn load_cart(&self, cart_id: Uuid) -> CatalogResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT cart_id, status, created_at, updated_at FROM carts WHERE cart_id = $1",
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT product_id, quantity
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_cart(items)?))
    }
}

/// Map a unique-index violation on `code` to `DuplicateCode`
fn map_code_conflict(err: sqlx::Error, code: &ProductCode) -> CatalogError {
    let is_unique_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|c| c == UNIQUE_VIOLATION);

    if is_unique_violation {
        CatalogError::DuplicateCode(code.to_string())
    } else {
        CatalogError::Database(err)
    }
}

// Quantity and stock are validated to fit `INTEGER`, so these never clamp.
fn quantity_to_db(quantity: Quantity) -> i32 {
    i32::try_from(quantity.get()).unwrap_or(i32::MAX)
}

fn stock_to_db(stock: u32) -> i32 {
    i32::try_from(stock).unwrap_or(i32::MAX)
}

impl ProductRepository for PgCatalogRepository {
    async fn find_page(&self, query: &ProductQuery) -> CatalogResult<Page<Product>> {
        let category = query.filter.category.map(|c| c.as_str());
        let status = query.filter.status;
        let sort = query.sort.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::BOOLEAN IS NULL OR status = $2)
            "#,
        )
        .bind(category)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::BOOLEAN IS NULL OR status = $2)
            ORDER BY
                CASE WHEN $3::TEXT = 'asc' THEN price END ASC,
                CASE WHEN $3::TEXT = 'desc' THEN price END DESC,
                created_at,
                product_id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(category)
        .bind(status)
        .bind(sort)
        .bind(i64::from(query.page.limit()))
        .bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(ProductRow::into_product)
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Page::new(
            products,
            u64::try_from(total).unwrap_or(0),
            query.page,
        ))
    }

    async fn find_all(&self) -> CatalogResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, product_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> CatalogResult<Option<Product>> {
        let Some(uuid) = id.as_uuid() else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>> {
        let uuids: Vec<Uuid> = ids.iter().filter_map(|id| id.as_uuid().copied()).collect();
        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn code_exists(
        &self,
        code: &ProductCode,
        except: Option<&ProductId>,
    ) -> CatalogResult<bool> {
        let except = except.and_then(|id| id.as_uuid().copied());

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM products
                WHERE code = $1 AND ($2::UUID IS NULL OR product_id <> $2)
            )
            "#,
        )
        .bind(code.as_str())
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (
                product_id,
                title,
                description,
                price,
                code,
                stock,
                category,
                status,
                thumbnails
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.code.as_str())
        .bind(stock_to_db(product.stock))
        .bind(product.category.as_str())
        .bind(product.status)
        .bind(&product.thumbnails)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_code_conflict(e, &product.code))?;

        row.into_product()
    }

    async fn update(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> CatalogResult<Option<Product>> {
        let Some(uuid) = id.as_uuid() else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                code = COALESCE($5, code),
                stock = COALESCE($6, stock),
                category = COALESCE($7, category),
                status = COALESCE($8, status),
                thumbnails = COALESCE($9, thumbnails),
                updated_at = NOW()
            WHERE product_id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(uuid)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(patch.code.as_ref().map(|c| c.as_str()))
        .bind(patch.stock.map(stock_to_db))
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.status)
        .bind(patch.thumbnails.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &patch.code {
            Some(code) => map_code_conflict(e, code),
            None => CatalogError::Database(e),
        })?;

        row.map(ProductRow::into_product).transpose()
    }

    async fn delete(&self, id: &ProductId) -> CatalogResult<bool> {
        let Some(uuid) = id.as_uuid() else {
            return Ok(false);
        };

        // Line items referencing the product go with it (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

impl CartRepository for PgCatalogRepository {
    async fn create(&self) -> CatalogResult<Cart> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            INSERT INTO carts (cart_id, status)
            VALUES ($1, $2)
            RETURNING cart_id, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(CartStatus::Active.code())
        .fetch_one(&self.pool)
        .await?;

        row.into_cart(Vec::new())
    }

    async fn find_by_id(&self, id: &CartId) -> CatalogResult<Option<Cart>> {
        match id.as_uuid() {
            Some(uuid) => self.load_cart(*uuid).await,
            None => Ok(None),
        }
    }

    async fn add_item(
        &self,
        id: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<Option<Cart>> {
        let Some(cart_id) = id.as_uuid().copied() else {
            return Ok(None);
        };
        let Some(product_id) = product.as_uuid().copied() else {
            return Err(CatalogError::ProductNotFound);
        };
        if !self.touch_cart(cart_id).await? {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity =
                LEAST(cart_items.quantity::BIGINT + EXCLUDED.quantity, 2147483647)
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity_to_db(quantity))
        .execute(&self.pool)
        .await?;

        self.load_cart(cart_id).await
    }

    async fn set_item_quantity(
        &self,
        id: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> CatalogResult<Option<Cart>> {
        let Some(cart_id) = id.as_uuid().copied() else {
            return Ok(None);
        };
        if !self.touch_cart(cart_id).await? {
            return Ok(None);
        }
        let Some(product_id) = product.as_uuid().copied() else {
            return Err(CatalogError::ItemNotInCart);
        };

        let updated = sqlx::query(
            "UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity_to_db(quantity))
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(CatalogError::ItemNotInCart);
        }

        self.load_cart(cart_id).await
    }

    async fn remove_item(&self, id: &CartId, product: &ProductId) -> CatalogResult<Option<Cart>> {
        let Some(cart_id) = id.as_uuid().copied() else {
            return Ok(None);
        };
        if !self.touch_cart(cart_id).await? {
            return Ok(None);
        }
        let Some(product_id) = product.as_uuid().copied() else {
            return Err(CatalogError::ItemNotInCart);
        };

        let deleted = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(CatalogError::ItemNotInCart);
        }

        self.load_cart(cart_id).await
    }

    async fn replace_items(
        &self,
        id: &CartId,
        items: Vec<LineItem>,
    ) -> CatalogResult<Option<Cart>> {
        let Some(cart_id) = id.as_uuid().copied() else {
            return Ok(None);
        };

        let (product_ids, quantities): (Vec<Uuid>, Vec<i32>) = items
            .iter()
            .filter_map(|item| {
                item.product
                    .as_uuid()
                    .map(|uuid| (*uuid, quantity_to_db(item.quantity)))
            })
            .unzip();

        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE carts SET updated_at = NOW() WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            SELECT $1, item.product_id, item.quantity
            FROM UNNEST($2::UUID[], $3::INTEGER[]) WITH ORDINALITY
                AS item(product_id, quantity, ord)
            ORDER BY item.ord
            "#,
        )
        .bind(cart_id)
        .bind(&product_ids)
        .bind(&quantities)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.load_cart(cart_id).await
    }

    async fn clear(&self, id: &CartId) -> CatalogResult<Option<Cart>> {
        let Some(cart_id) = id.as_uuid().copied() else {
            return Ok(None);
        };
        if !self.touch_cart(cart_id).await? {
            return Ok(None);
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        self.load_cart(cart_id).await
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: Uuid,
    title: String,
    description: String,
    price: Decimal,
    code: String,
    stock: i32,
    category: String,
    status: bool,
    thumbnails: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> CatalogResult<Product> {
        let stock = u32::try_from(self.stock)
            .map_err(|_| CatalogError::Internal(format!("negative stock for {}", self.product_id)))?;

        Ok(Product {
            id: ProductId::from_uuid(self.product_id),
            title: self.title,
            description: self.description,
            price: self.price,
            code: ProductCode::new(&self.code)?,
            stock,
            category: self.category.parse::<Category>()?,
            status: self.status,
            thumbnails: self.thumbnails,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    cart_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartRow {
    fn into_cart(self, items: Vec<CartItemRow>) -> CatalogResult<Cart> {
        let status = CartStatus::from_code(&self.status).ok_or_else(|| {
            CatalogError::Internal(format!("unknown cart status: {}", self.status))
        })?;

        let products = items
            .into_iter()
            .map(CartItemRow::into_line_item)
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Cart {
            id: CartId::from_uuid(self.cart_id),
            products,
            status,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: Uuid,
    quantity: i32,
}

impl CartItemRow {
    fn into_line_item(self) -> CatalogResult<LineItem> {
        let quantity = Quantity::from_i64(i64::from(self.quantity))?;
        Ok(LineItem::new(ProductId::from_uuid(self.product_id), quantity))
    }
}
