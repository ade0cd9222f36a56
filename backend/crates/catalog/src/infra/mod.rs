//! Infrastructure Layer - Repository implementations

pub mod file;
pub mod postgres;
