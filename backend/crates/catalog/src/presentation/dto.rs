//! API DTOs (Data Transfer Objects)

use axum::extract::FromRequest;
use kernel::id::ProductId;
use kernel::pagination::Page;
use serde::{Deserialize, Serialize};

use crate::application::config::CatalogConfig;
use crate::domain::entity::{LineItem, Product};
use crate::domain::value_object::{PriceSort, ProductFilter, ProductQuery, Quantity};
use crate::error::{CatalogError, CatalogResult};

/// `Json` extractor whose rejections use the catalog error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CatalogError))]
pub struct ApiJson<T>(pub T);

/// Query string for product listings (API and home page).
///
/// Values stay strings so malformed numbers produce a catalog error
/// rather than an extractor rejection. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(field: &'static str, value: Option<&str>) -> CatalogResult<Option<u32>> {
    value
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| CatalogError::validation(field, "must be a positive integer"))
        })
        .transpose()
}

impl ListProductsParams {
    pub fn into_query(&self, config: &CatalogConfig) -> CatalogResult<ProductQuery> {
        let page = parse_number("page", non_empty(&self.page))?;
        let limit = parse_number("limit", non_empty(&self.limit))?;
        let page = config.page_request(page, limit)?;

        let sort = non_empty(&self.sort)
            .map(str::parse::<PriceSort>)
            .transpose()?;

        let category = non_empty(&self.category).map(str::parse).transpose()?;

        let status = non_empty(&self.status)
            .map(|s| match s.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(CatalogError::validation("status", "must be true or false")),
            })
            .transpose()?;

        Ok(ProductQuery::new(page)
            .with_sort(sort)
            .with_filter(ProductFilter { category, status }))
    }
}

/// Link to another page of the same listing, keeping limit, sort and filters
pub fn page_link(base: &str, page: u32, query: &ProductQuery) -> String {
    let mut link = format!("{}?page={}&limit={}", base, page, query.page.limit());
    if let Some(sort) = query.sort {
        link.push_str("&sort=");
        link.push_str(sort.as_str());
    }
    if let Some(category) = query.filter.category {
        link.push_str("&category=");
        link.push_str(category.as_str());
    }
    if let Some(status) = query.filter.status {
        link.push_str(&format!("&status={}", status));
    }
    link
}

/// Response for GET /api/products
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub page: Page<Product>,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

impl ProductPageResponse {
    pub fn new(page: Page<Product>, base: &str, query: &ProductQuery) -> Self {
        let prev_link = page.prev_page.map(|p| page_link(base, p, query));
        let next_link = page.next_page.map(|p| page_link(base, p, query));
        Self {
            status: "success",
            page,
            prev_link,
            next_link,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartResponse<T> {
    pub cart: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body for adding to a cart or setting a line-item quantity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuantityRequest {
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl QuantityRequest {
    /// Quantity for an exact update: required and at least 1
    pub fn exact(&self) -> CatalogResult<Quantity> {
        let quantity = self
            .quantity
            .ok_or(CatalogError::MissingFields(vec!["quantity"]))?;
        Quantity::from_i64(quantity)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub product: ProductId,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Request for PUT /api/carts/{cid}
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceCartRequest {
    pub products: Vec<LineItemInput>,
}

impl ReplaceCartRequest {
    /// An omitted quantity means one unit; an explicit one must be at least 1
    pub fn into_line_items(self) -> CatalogResult<Vec<LineItem>> {
        self.products
            .into_iter()
            .map(|input| {
                let quantity = match input.quantity {
                    Some(q) => Quantity::from_i64(q)?,
                    None => Quantity::ONE,
                };
                Ok(LineItem::new(input.product, quantity))
            })
            .collect()
    }
}
