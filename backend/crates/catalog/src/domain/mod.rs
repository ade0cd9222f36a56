//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Product, Cart, CartDetail)
//! - Domain value objects (ProductCode, Category, Quantity, CartStatus, ProductQuery)
//! - Repository traits (interfaces)

pub mod entity;
pub mod repository;
pub mod value_object;
