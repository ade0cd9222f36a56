//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of shop vocabulary:
//! - Common error types and result aliases
//! - Record ID types usable by every storage backend
//! - Page arithmetic for listings
//!
//! Only things with the same meaning in every bounded context belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod pagination;
