//! Catalog Error Types
//!
//! Product and cart error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::ParseIdError;
use platform::json_file::JsonFileError;
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-specific error variants
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Cart not found")]
    CartNotFound,

    #[error("Product not found in cart")]
    ItemNotInCart,

    /// Another product already uses this code
    #[error("Product code already exists: {0}")]
    DuplicateCode(String),

    /// One or more required fields absent on create
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Field present but out of range / too long / not allowed
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Request body missing, not JSON, or the wrong shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Flat-file storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] JsonFileError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CatalogError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::ProductNotFound
            | CatalogError::CartNotFound
            | CatalogError::ItemNotInCart => ErrorKind::NotFound,
            CatalogError::DuplicateCode(_)
            | CatalogError::MissingFields(_)
            | CatalogError::Validation { .. }
            | CatalogError::InvalidId(_)
            | CatalogError::InvalidBody(_) => ErrorKind::BadRequest,
            CatalogError::Storage(_) | CatalogError::Database(_) | CatalogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            CatalogError::Storage(e) => {
                tracing::error!(error = %e, "Catalog storage error");
            }
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::DuplicateCode(code) => {
                tracing::warn!(code = %code, "Rejected duplicate product code");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl From<ParseIdError> for CatalogError {
    fn from(err: ParseIdError) -> Self {
        CatalogError::InvalidId(err.0)
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        CatalogError::InvalidBody(rejection.body_text())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            // Kernel mapping keeps driver details out of the response body
            CatalogError::Database(e) => AppError::from(e),
            CatalogError::Storage(e) => AppError::internal("Storage error").with_source(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
