//! `Kind` and `OneMany` allow serde to accept either a bare string/object or
//! a single value/array wherever the W3C data model permits both shapes.

use serde::{Deserialize, Serialize};

/// Either a plain string (e.g. a URI) or a full object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value.
    String(String),

    /// Complex object value.
    Object(T),
}

impl<T: Default> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl<T: Default> Kind<T> {
    /// Returns `true` if this is the string variant.
    pub const fn is_string(&self) -> bool {
        match self {
            Self::String(_) => true,
            Self::Object(_) => false,
        }
    }

    /// Returns `true` if this is the object variant.
    pub const fn is_object(&self) -> bool {
        match self {
            Self::String(_) => false,
            Self::Object(_) => true,
        }
    }
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Either a single object or a set of objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// Single object.
    One(T),

    /// Set of objects.
    Many(Vec<T>),
}

impl<T: Default> Default for OneMany<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T: Clone + Default + PartialEq> OneMany<T> {
    /// Returns `true` if this holds a single object.
    pub const fn is_one(&self) -> bool {
        match self {
            Self::One(_) => true,
            Self::Many(_) => false,
        }
    }

    /// Returns `true` if this holds a set of objects.
    pub const fn is_many(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(_) => true,
        }
    }

    /// Adds an item, promoting `One` to `Many` if needed.
    pub fn add(&mut self, item: T) {
        match self {
            Self::One(one) => {
                *self = Self::Many(vec![one.clone(), item]);
            }
            Self::Many(many) => {
                many.push(item);
            }
        }
    }

    /// Number of items held.
    pub const fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(many) => many.len(),
        }
    }

    /// Returns `true` if this is an empty `Many`.
    pub const fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(many) => many.is_empty(),
        }
    }

    /// Returns the items as a slice-friendly `Vec`, cloning if necessary.
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Self::One(one) => vec![one.clone()],
            Self::Many(many) => many.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_many_add_promotes() {
        let mut om = OneMany::One(1u32);
        om.add(2);
        assert!(om.is_many());
        assert_eq!(om.len(), 2);
        assert_eq!(om.to_vec(), vec![1, 2]);
    }

    #[test]
    fn kind_serde_roundtrip() {
        let k: Kind<serde_json::Value> = Kind::String("did:key:z6Mk".into());
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"did:key:z6Mk\"");
        let back: Kind<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, k);
    }
}
