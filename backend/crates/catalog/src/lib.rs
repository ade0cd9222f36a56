//! Catalog Backend Module
//!
//! Products and shopping carts.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and the product broadcast seam
//! - `infra/` - Flat JSON file and PostgreSQL repositories
//! - `presentation/` - JSON API handlers and HTML views
//!
//! ## Storage
//! Both repositories enforce the same validation. The file store uses
//! sequential integer ids; PostgreSQL uses UUIDs.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::broadcast::{NoopBroadcaster, ProductBroadcaster};
pub use application::config::CatalogConfig;
pub use application::manage_carts::ManageCartsUseCase;
pub use application::manage_products::ManageProductsUseCase;
pub use error::{CatalogError, CatalogResult};
pub use infra::file::{FileCartRepository, FileProductRepository};
pub use infra::postgres::PgCatalogRepository;
pub use presentation::router::catalog_router;
pub use presentation::views::not_found;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};
