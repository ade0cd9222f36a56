//! Application Configuration
//!
//! Configuration for the catalog application layer.

use kernel::pagination::PageRequest;

use crate::error::{CatalogError, CatalogResult};

/// Catalog application configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Page size when a listing does not ask for one
    pub default_page_limit: u32,
    /// Largest page size a client may request
    pub max_page_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 10,
            max_page_limit: 100,
        }
    }
}

impl CatalogConfig {
    /// Resolve optional page/limit into a validated request
    pub fn page_request(&self, page: Option<u32>, limit: Option<u32>) -> CatalogResult<PageRequest> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(self.default_page_limit);

        if limit > self.max_page_limit {
            return Err(CatalogError::validation(
                "limit",
                format!("must be between 1 and {}", self.max_page_limit),
            ));
        }

        PageRequest::new(page, limit).ok_or_else(|| {
            if page == 0 {
                CatalogError::validation("page", "must be at least 1")
            } else {
                CatalogError::validation(
                    "limit",
                    format!("must be between 1 and {}", self.max_page_limit),
                )
            }
        })
    }
}
