//! Product Entity
//!
//! A sellable item. Both storage backends persist this same shape; only
//! the id flavour and the presence of timestamps differ.

use chrono::{DateTime, Utc};
use kernel::id::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Category, ProductCode};
use crate::error::{CatalogError, CatalogResult};

const TITLE_MAX_LENGTH: usize = 100;
const DESCRIPTION_MAX_LENGTH: usize = 1000;
/// Largest stock both backends store exactly (`INTEGER` column)
pub const STOCK_MAX: u32 = i32::MAX as u32;
/// Prices keep at most two decimals and stay below 10^10 (`NUMERIC(12, 2)`)
const PRICE_MAX_SCALE: u32 = 2;
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub code: ProductCode,
    pub stock: u32,
    pub category: Category,
    /// Active (listed) or inactive
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(default)]
    pub thumbnails: Vec<String>,
    /// Set by the database backend only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_status() -> bool {
    true
}

/// Validated data for a product that has no id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub code: ProductCode,
    pub stock: u32,
    pub category: Category,
    pub status: bool,
    pub thumbnails: Vec<String>,
}

impl NewProduct {
    pub fn into_product(self, id: ProductId, now: Option<DateTime<Utc>>) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            code: self.code,
            stock: self.stock,
            category: self.category,
            status: self.status,
            thumbnails: self.thumbnails,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub code: Option<ProductCode>,
    pub stock: Option<u32>,
    pub category: Option<Category>,
    pub status: Option<bool>,
    pub thumbnails: Option<Vec<String>>,
}

impl ProductPatch {
    /// Merge into `product`. The id is never touched.
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(code) = self.code {
            product.code = code;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(thumbnails) = self.thumbnails {
            product.thumbnails = thumbnails;
        }
    }
}

/// One string or a list of strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Thumbnails {
    One(String),
    Many(Vec<String>),
}

impl Thumbnails {
    fn into_vec(self) -> Vec<String> {
        let list = match self {
            Thumbnails::One(s) => vec![s],
            Thumbnails::Many(v) => v,
        };
        list.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Unvalidated product fields as received from a client.
///
/// Any `id` sent by the client is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub code: Option<String>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub status: Option<bool>,
    pub thumbnails: Option<Thumbnails>,
}

impl ProductDraft {
    /// Validate for creation: every required field must be present.
    pub fn into_new_product(self) -> CatalogResult<NewProduct> {
        let missing: Vec<&'static str> = [
            ("title", self.title.is_none()),
            ("description", self.description.is_none()),
            ("price", self.price.is_none()),
            ("code", self.code.is_none()),
            ("stock", self.stock.is_none()),
            ("category", self.category.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(CatalogError::MissingFields(missing));
        }

        let patch = self.into_patch()?;
        match patch {
            ProductPatch {
                title: Some(title),
                description: Some(description),
                price: Some(price),
                code: Some(code),
                stock: Some(stock),
                category: Some(category),
                status,
                thumbnails,
            } => Ok(NewProduct {
                title,
                description,
                price,
                code,
                stock,
                category,
                status: status.unwrap_or(true),
                thumbnails: thumbnails.unwrap_or_default(),
            }),
            _ => Err(CatalogError::Internal(
                "validated draft lost a required field".to_string(),
            )),
        }
    }

    /// Validate each supplied field for a partial update.
    pub fn into_patch(self) -> CatalogResult<ProductPatch> {
        Ok(ProductPatch {
            title: self.title.map(validate_title).transpose()?,
            description: self.description.map(validate_description).transpose()?,
            price: self.price.map(validate_price).transpose()?,
            code: self.code.map(ProductCode::new).transpose()?,
            stock: self.stock.map(validate_stock).transpose()?,
            category: self.category.map(|c| c.parse()).transpose()?,
            status: self.status,
            thumbnails: self.thumbnails.map(Thumbnails::into_vec),
        })
    }
}

fn validate_title(title: String) -> CatalogResult<String> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(CatalogError::validation("title", "must not be empty"));
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Err(CatalogError::validation(
            "title",
            format!("must be at most {} characters", TITLE_MAX_LENGTH),
        ));
    }
    Ok(title)
}

fn validate_description(description: String) -> CatalogResult<String> {
    if description.trim().is_empty() {
        return Err(CatalogError::validation("description", "must not be empty"));
    }
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        return Err(CatalogError::validation(
            "description",
            format!("must be at most {} characters", DESCRIPTION_MAX_LENGTH),
        ));
    }
    Ok(description)
}

fn validate_price(price: Decimal) -> CatalogResult<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::validation("price", "must not be negative"));
    }
    let price = price.normalize();
    if price.scale() > PRICE_MAX_SCALE {
        return Err(CatalogError::validation(
            "price",
            format!("must have at most {} decimals", PRICE_MAX_SCALE),
        ));
    }
    if price >= Decimal::from(PRICE_LIMIT) {
        return Err(CatalogError::validation(
            "price",
            format!("must be less than {}", PRICE_LIMIT),
        ));
    }
    Ok(price)
}

fn validate_stock(stock: i64) -> CatalogResult<u32> {
    if stock < 0 {
        return Err(CatalogError::validation("stock", "must not be negative"));
    }
    u32::try_from(stock)
        .ok()
        .filter(|s| *s <= STOCK_MAX)
        .ok_or_else(|| {
            CatalogError::validation("stock", format!("must be at most {}", STOCK_MAX))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> ProductDraft {
        serde_json::from_value(serde_json::json!({
            "title": "Game",
            "description": "desc",
            "price": 10,
            "code": "abc",
            "stock": 5,
            "category": "Videojuego"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_draft() {
        let product = game().into_new_product().unwrap();
        assert_eq!(product.code.as_str(), "ABC");
        assert_eq!(product.price, Decimal::from(10));
        assert!(product.status);
        assert!(product.thumbnails.is_empty());
    }

    #[test]
    fn test_missing_fields_listed() {
        let draft = ProductDraft {
            title: Some("Game".into()),
            ..Default::default()
        };
        match draft.into_new_product() {
            Err(CatalogError::MissingFields(fields)) => {
                assert_eq!(
                    fields,
                    vec!["description", "price", "code", "stock", "category"]
                );
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut draft = game();
        draft.stock = Some(-1);
        assert!(matches!(
            draft.into_new_product(),
            Err(CatalogError::Validation { field: "stock", .. })
        ));

        let mut draft = game();
        draft.price = Some(Decimal::from(-1));
        assert!(matches!(
            draft.into_new_product(),
            Err(CatalogError::Validation { field: "price", .. })
        ));
    }

    #[test]
    fn test_stock_bounds() {
        let mut draft = game();
        draft.stock = Some(i64::from(STOCK_MAX));
        assert_eq!(draft.into_new_product().unwrap().stock, STOCK_MAX);

        let mut draft = game();
        draft.stock = Some(3_000_000_000);
        assert!(matches!(
            draft.into_patch(),
            Err(CatalogError::Validation { field: "stock", .. })
        ));
    }

    #[test]
    fn test_price_bounds() {
        let mut draft = game();
        draft.price = Some("10.50".parse().unwrap());
        assert_eq!(
            draft.into_new_product().unwrap().price,
            "10.5".parse::<Decimal>().unwrap()
        );

        let mut draft = game();
        draft.price = Some("9999999999.99".parse().unwrap());
        assert!(draft.into_new_product().is_ok());

        for bad in ["10.555", "10000000000"] {
            let mut draft = game();
            draft.price = Some(bad.parse().unwrap());
            assert!(
                matches!(
                    draft.into_new_product(),
                    Err(CatalogError::Validation { field: "price", .. })
                ),
                "{} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_single_thumbnail_wrapped() {
        let draft: ProductDraft =
            serde_json::from_value(serde_json::json!({ "thumbnails": "img/a.png" })).unwrap();
        let patch = draft.into_patch().unwrap();
        assert_eq!(patch.thumbnails, Some(vec!["img/a.png".to_string()]));
    }

    #[test]
    fn test_patch_preserves_id() {
        let mut product = game()
            .into_new_product()
            .unwrap()
            .into_product(ProductId::from_seq(1), None);

        let draft: ProductDraft = serde_json::from_value(serde_json::json!({
            "id": 99,
            "stock": 0,
            "status": false
        }))
        .unwrap();
        draft.into_patch().unwrap().apply(&mut product);

        assert_eq!(product.id, ProductId::from_seq(1));
        assert_eq!(product.stock, 0);
        assert!(!product.status);
        assert_eq!(product.title, "Game");
    }

    #[test]
    fn test_file_shape_has_no_timestamps() {
        let product = game()
            .into_new_product()
            .unwrap()
            .into_product(ProductId::from_seq(1), None);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], 1);
        assert!(json.get("createdAt").is_none());
    }
}
