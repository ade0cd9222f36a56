//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations that carry no shop
//! vocabulary:
//! - JSON array file storage (whole-file read/write)

pub mod json_file;
