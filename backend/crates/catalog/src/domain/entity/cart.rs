//! Cart Entity

use chrono::{DateTime, Utc};
use kernel::id::{CartId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::entity::product::Product;
use crate::domain::value_object::{CartStatus, Quantity};
use crate::error::{CatalogError, CatalogResult};

/// A product reference with a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: ProductId,
    pub quantity: Quantity,
}

impl LineItem {
    pub fn new(product: ProductId, quantity: Quantity) -> Self {
        Self { product, quantity }
    }
}

/// Cart entity
///
/// A product appears at most once in `products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    #[serde(default)]
    pub products: Vec<LineItem>,
    #[serde(default)]
    pub status: CartStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            products: Vec::new(),
            status: CartStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    fn position(&self, product: &ProductId) -> Option<usize> {
        self.products.iter().position(|item| &item.product == product)
    }

    pub fn quantity_of(&self, product: &ProductId) -> Option<Quantity> {
        self.position(product).map(|i| self.products[i].quantity)
    }

    /// Add `quantity` units, incrementing an existing line item.
    pub fn add_product(&mut self, product: ProductId, quantity: Quantity) {
        match self.position(&product) {
            Some(i) => {
                let item = &mut self.products[i];
                item.quantity = item.quantity.saturating_add(quantity);
            }
            None => self.products.push(LineItem::new(product, quantity)),
        }
    }

    pub fn set_quantity(&mut self, product: &ProductId, quantity: Quantity) -> CatalogResult<()> {
        let i = self.position(product).ok_or(CatalogError::ItemNotInCart)?;
        self.products[i].quantity = quantity;
        Ok(())
    }

    pub fn remove_product(&mut self, product: &ProductId) -> CatalogResult<()> {
        let i = self.position(product).ok_or(CatalogError::ItemNotInCart)?;
        self.products.remove(i);
        Ok(())
    }

    /// Replace every line item. Duplicate product references are merged.
    pub fn replace_products(&mut self, items: Vec<LineItem>) {
        self.products = merge_line_items(items);
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }
}

/// Collapse repeated product references, summing their quantities.
/// First-seen order is kept.
pub fn merge_line_items(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|m| m.product == item.product) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }
    merged
}

/// Line item with its product resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    /// `None` when the product was deleted after being added
    pub product: Option<Product>,
    pub quantity: Quantity,
    pub subtotal: Decimal,
}

/// Cart with populated products, as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDetail {
    pub id: CartId,
    pub status: CartStatus,
    pub products: Vec<CartLine>,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartDetail {
    /// Pair each line item with its product from `products`.
    /// Lines whose product no longer exists count zero towards the total.
    pub fn populate(cart: Cart, products: &[Product]) -> Self {
        let lines: Vec<CartLine> = cart
            .products
            .into_iter()
            .map(|item| {
                let product = products.iter().find(|p| p.id == item.product).cloned();
                let subtotal = product
                    .as_ref()
                    .map(|p| p.price * Decimal::from(item.quantity.get()))
                    .unwrap_or(Decimal::ZERO);
                CartLine {
                    product_id: item.product,
                    product,
                    quantity: item.quantity,
                    subtotal,
                }
            })
            .collect();

        let total = lines.iter().map(|line| line.subtotal).sum();

        Self {
            id: cart.id,
            status: cart.status,
            products: lines,
            total,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }

    pub fn item_count(&self) -> u64 {
        self.products.iter().map(|l| u64::from(l.quantity.get())).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{Category, ProductCode};

    fn pid(n: u64) -> ProductId {
        ProductId::from_seq(n)
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn product(id: u64, price: i64) -> Product {
        Product {
            id: pid(id),
            title: format!("P{}", id),
            description: "d".into(),
            price: Decimal::from(price),
            code: ProductCode::new(format!("C{}", id)).unwrap(),
            stock: 1,
            category: Category::Consola,
            status: true,
            thumbnails: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_add_increments_existing() {
        let mut cart = Cart::new(CartId::from_seq(1));
        cart.add_product(pid(7), Quantity::ONE);
        cart.add_product(pid(7), qty(2));
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.quantity_of(&pid(7)), Some(qty(3)));
    }

    #[test]
    fn test_set_and_remove_require_item() {
        let mut cart = Cart::new(CartId::from_seq(1));
        assert!(matches!(
            cart.set_quantity(&pid(1), qty(2)),
            Err(CatalogError::ItemNotInCart)
        ));
        assert!(matches!(
            cart.remove_product(&pid(1)),
            Err(CatalogError::ItemNotInCart)
        ));

        cart.add_product(pid(1), Quantity::ONE);
        cart.set_quantity(&pid(1), qty(5)).unwrap();
        assert_eq!(cart.quantity_of(&pid(1)), Some(qty(5)));
        cart.remove_product(&pid(1)).unwrap();
        assert!(cart.products.is_empty());
    }

    #[test]
    fn test_replace_merges_duplicates() {
        let mut cart = Cart::new(CartId::from_seq(1));
        cart.replace_products(vec![
            LineItem::new(pid(1), qty(1)),
            LineItem::new(pid(2), qty(4)),
            LineItem::new(pid(1), qty(2)),
        ]);
        assert_eq!(
            cart.products,
            vec![LineItem::new(pid(1), qty(3)), LineItem::new(pid(2), qty(4))]
        );
    }

    #[test]
    fn test_total_skips_missing_products() {
        let mut cart = Cart::new(CartId::from_seq(1));
        cart.add_product(pid(1), qty(2));
        cart.add_product(pid(9), qty(1));
        let detail = CartDetail::populate(cart, &[product(1, 15)]);

        assert_eq!(detail.total, Decimal::from(30));
        assert!(detail.products[1].product.is_none());
        assert_eq!(detail.item_count(), 3);
    }

    #[test]
    fn test_file_shape() {
        let json = serde_json::json!({
            "id": 3,
            "products": [{ "product": 1, "quantity": 2 }]
        });
        let cart: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(cart.status, CartStatus::Active);
        assert_eq!(cart.quantity_of(&pid(1)), Some(qty(2)));
    }
}
