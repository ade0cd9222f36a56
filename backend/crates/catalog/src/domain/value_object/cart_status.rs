//! Cart lifecycle status

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    #[default]
    Active,
    Inactive,
}

impl CartStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for status in [CartStatus::Active, CartStatus::Inactive] {
            assert_eq!(CartStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(CartStatus::from_code("deleted"), None);
        assert_eq!(CartStatus::default(), CartStatus::Active);
    }
}
