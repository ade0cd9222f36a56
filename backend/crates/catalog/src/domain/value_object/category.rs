//! Product Category Value Object
//!
//! Categories are a closed set. Input is matched case-insensitively and
//! always stored/rendered in its canonical spelling.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Category {
    Videojuego,
    Consola,
    Accesorio,
    Coleccionable,
    Merchandising,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Videojuego,
        Category::Consola,
        Category::Accesorio,
        Category::Coleccionable,
        Category::Merchandising,
    ];

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Videojuego => "Videojuego",
            Self::Consola => "Consola",
            Self::Accesorio => "Accesorio",
            Self::Coleccionable => "Coleccionable",
            Self::Merchandising => "Merchandising",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            let allowed: Vec<&str> = Self::ALL.iter().map(Category::as_str).collect();
            CatalogError::validation(
                "category",
                format!("'{}' is not one of {}", s.trim(), allowed.join(", ")),
            )
        })
    }
}

impl TryFrom<String> for Category {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("videojuego".parse::<Category>().unwrap(), Category::Videojuego);
        assert_eq!("  CONSOLA ".parse::<Category>().unwrap(), Category::Consola);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = "Comida".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("Comida"));
    }

    #[test]
    fn test_json_uses_canonical_name() {
        let c: Category = serde_json::from_str("\"accesorio\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"Accesorio\"");
    }
}
