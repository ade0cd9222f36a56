//! Product listing query: page window, price sort and filters

use kernel::pagination::PageRequest;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::entity::product::Product;
use crate::domain::value_object::category::Category;
use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Asc,
    Desc,
}

impl PriceSort {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PriceSort::Asc => "asc",
            PriceSort::Desc => "desc",
        }
    }

    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            PriceSort::Asc => a.price.cmp(&b.price),
            PriceSort::Desc => b.price.cmp(&a.price),
        }
    }
}

impl FromStr for PriceSort {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(PriceSort::Asc),
            "desc" => Ok(PriceSort::Desc),
            other => Err(CatalogError::validation(
                "sort",
                format!("'{}' must be 'asc' or 'desc'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub status: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.category.is_none_or(|c| product.category == c)
            && self.status.is_none_or(|s| product.status == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: PageRequest,
    pub sort: Option<PriceSort>,
    pub filter: ProductFilter,
}

impl ProductQuery {
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            sort: None,
            filter: ProductFilter::default(),
        }
    }

    pub fn with_sort(mut self, sort: Option<PriceSort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, filter: ProductFilter) -> Self {
        self.filter = filter;
        self
    }
}
