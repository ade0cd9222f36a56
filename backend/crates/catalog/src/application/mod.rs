//! Application Layer - Use cases

pub mod broadcast;
pub mod config;
pub mod manage_carts;
pub mod manage_products;
