pub mod cart;
pub mod product;

pub use cart::{Cart, CartDetail, CartLine, LineItem};
pub use product::{NewProduct, Product, ProductDraft, ProductPatch, Thumbnails};
