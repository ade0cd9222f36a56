//! Presentation Layer - HTTP handlers, DTOs, HTML views

pub mod dto;
pub mod handlers;
pub mod router;
pub mod views;
