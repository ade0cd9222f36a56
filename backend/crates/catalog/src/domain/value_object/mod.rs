//! Domain Value Objects
//!
//! Validated, immutable values shared by products and carts.

pub mod cart_status;
pub mod category;
pub mod product_code;
pub mod product_query;
pub mod quantity;

pub use cart_status::CartStatus;
pub use category::Category;
pub use product_code::ProductCode;
pub use product_query::{PriceSort, ProductFilter, ProductQuery};
pub use quantity::Quantity;
