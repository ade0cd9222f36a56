//! Product Code Value Object
//!
//! The code is the business key of a product: trimmed, uppercased and
//! unique across the catalog. Uniqueness is enforced by the repositories.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;

const CODE_MAX_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductCode(String);

impl ProductCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, CatalogError> {
        let code = code.as_ref().trim().to_uppercase();

        if code.is_empty() {
            return Err(CatalogError::validation("code", "must not be empty"));
        }
        if code.chars().count() > CODE_MAX_LENGTH {
            return Err(CatalogError::validation(
                "code",
                format!("must be at most {} characters", CODE_MAX_LENGTH),
            ));
        }
        if code.chars().any(char::is_whitespace) {
            return Err(CatalogError::validation("code", "must not contain spaces"));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductCode {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductCode> for String {
    fn from(code: ProductCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_trimmed_and_uppercased() {
        let code = ProductCode::new("  abc-01 ").unwrap();
        assert_eq!(code.as_str(), "ABC-01");
    }

    #[test]
    fn test_code_limits() {
        assert!(ProductCode::new("").is_err());
        assert!(ProductCode::new("   ").is_err());
        assert!(ProductCode::new("A B").is_err());
        assert!(ProductCode::new("X".repeat(30)).is_ok());
        assert!(ProductCode::new("X".repeat(31)).is_err());
    }

    #[test]
    fn test_codes_compare_after_normalisation() {
        assert_eq!(ProductCode::new("abc").unwrap(), ProductCode::new("ABC").unwrap());
    }
}
