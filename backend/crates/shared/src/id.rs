//! Common ID Types
//!
//! Type-safe ID wrappers for stored records.
//!
//! A record id is either a sequential integer (flat-file storage) or an
//! opaque UUID (database storage). Both render through the same typed
//! wrapper so handlers never care which backend produced it.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Raw identifier value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdValue {
    /// Auto-incremented integer (1, 2, 3, ...)
    Seq(u64),
    /// Random UUID (v4)
    Uuid(Uuid),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Seq(n) => write!(f, "{}", n),
            IdValue::Uuid(u) => write!(f, "{}", u),
        }
    }
}

/// Error returned when a path segment is neither an integer nor a UUID
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid id: {0}")]
pub struct ParseIdError(pub String);

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type ProductId = Id<markers::Product>;
///
/// let id: ProductId = "42".parse().unwrap();
/// assert_eq!(id.as_seq(), Some(42));
/// ```
pub struct Id<T> {
    value: IdValue,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random ID (UUID v4)
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Create from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: IdValue::Uuid(uuid),
            _marker: PhantomData,
        }
    }

    /// Create from a sequence number
    pub fn from_seq(seq: u64) -> Self {
        Self {
            value: IdValue::Seq(seq),
            _marker: PhantomData,
        }
    }

    pub fn value(&self) -> IdValue {
        self.value
    }

    /// Get the underlying UUID, if this is a UUID id
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match &self.value {
            IdValue::Uuid(u) => Some(u),
            IdValue::Seq(_) => None,
        }
    }

    /// Get the sequence number, if this is an integer id
    pub fn as_seq(&self) -> Option<u64> {
        match self.value {
            IdValue::Seq(n) => Some(n),
            IdValue::Uuid(_) => None,
        }
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls: derives would demand the same traits on the marker type.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<u64> for Id<T> {
    fn from(seq: u64) -> Self {
        Self::from_seq(seq)
    }
}

impl<T> FromStr for Id<T> {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u64>()
                .map(Self::from_seq)
                .map_err(|_| ParseIdError(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self::from_uuid)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.value {
            IdValue::Seq(n) => serializer.serialize_u64(*n),
            IdValue::Uuid(u) => serializer.collect_str(u),
        }
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor<T>(PhantomData<T>);

        impl<T> Visitor<'_> for IdVisitor<T> {
            type Value = Id<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a UUID string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Id::from_seq(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(Id::from_seq)
                    .map_err(|_| E::custom("id must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor(PhantomData))
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for Product IDs
    pub struct Product;

    /// Marker for Cart IDs
    pub struct Cart;
}

/// Type aliases for common IDs
pub type ProductId = Id<markers::Product>;
pub type CartId = Id<markers::Cart>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_type_safety() {
        let product_id: ProductId = Id::new();
        let cart_id: CartId = Id::new();

        // These are different types, cannot be mixed
        assert!(product_id.as_uuid().is_some());
        assert!(cart_id.as_uuid().is_some());
    }

    #[test]
    fn test_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id: ProductId = Id::from_uuid(uuid);
        assert_eq!(id.as_uuid(), Some(&uuid));
        assert_eq!(id.as_seq(), None);
    }

    #[test]
    fn test_parse_seq_and_uuid() {
        let id: ProductId = "7".parse().unwrap();
        assert_eq!(id.as_seq(), Some(7));

        let uuid = Uuid::new_v4();
        let id: ProductId = uuid.to_string().parse().unwrap();
        assert_eq!(id.as_uuid(), Some(&uuid));

        assert!("abc".parse::<ProductId>().is_err());
        assert!("".parse::<ProductId>().is_err());
        assert!("-1".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let seq: ProductId = Id::from_seq(3);
        assert_eq!(serde_json::to_string(&seq).unwrap(), "3");

        let uuid = Uuid::nil();
        let doc: ProductId = Id::from_uuid(uuid);
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            "\"00000000-0000-0000-0000-000000000000\""
        );

        let back: ProductId = serde_json::from_str("3").unwrap();
        assert_eq!(back, seq);
        let back: ProductId =
            serde_json::from_str("\"00000000-0000-0000-0000-000000000000\"").unwrap();
        assert_eq!(back, doc);
    }
}
