//! Line-item quantity, always at least 1

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);
    /// Largest quantity both backends store exactly (`INTEGER` column)
    pub const MAX: Quantity = Quantity(i32::MAX as u32);

    pub fn new(value: u32) -> Result<Self, CatalogError> {
        if value == 0 {
            return Err(CatalogError::validation("quantity", "must be at least 1"));
        }
        if value > Self::MAX.0 {
            return Err(CatalogError::validation(
                "quantity",
                format!("must be at most {}", Self::MAX.0),
            ));
        }
        Ok(Self(value))
    }

    /// Accepts a raw signed value from a request body
    pub fn from_i64(value: i64) -> Result<Self, CatalogError> {
        if value < 1 {
            return Err(CatalogError::validation("quantity", "must be at least 1"));
        }
        let value = u32::try_from(value).unwrap_or(u32::MAX);
        Self::new(value)
    }

    /// Request bodies that omit the quantity or send a non-positive one
    /// add a single unit. Oversized values saturate like repeated adds do.
    pub fn or_one(value: Option<i64>) -> Self {
        value
            .map(|v| v.min(i64::from(Self::MAX.0)))
            .and_then(|v| Self::from_i64(v).ok())
            .unwrap_or(Self::ONE)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Sum of two quantities, saturating at [`Quantity::MAX`]
    pub fn saturating_add(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(other.0).min(Self::MAX.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = CatalogError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}
