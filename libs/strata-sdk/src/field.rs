//! Tri-state field values.
//!
//! Server objects are fetched partially (list endpoints return a subset of
//! fields) and patched partially. `Option<T>` cannot tell "not loaded / not
//! supplied" from "explicitly cleared", so those fields use [`Field<T>`]:
//!
//! | JSON                | `Field`       |
//! |---------------------|---------------|
//! | key missing         | `Unset`       |
//! | `"key": null`       | `Null`        |
//! | `"key": value`      | `Value(v)`    |
//!
//! Struct fields must carry `#[serde(default, skip_serializing_if = "Field::is_unset")]`
//! so that missing keys deserialize as `Unset` and `Unset` is not written out.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> Field<T> {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// The value, if one is present.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unset | Self::Null => None,
        }
    }

    #[must_use]
    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unset | Self::Null => None,
        }
    }

    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unset | Self::Null => None,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Unset => Field::Unset,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(f(v)),
        }
    }

    /// `None` maps to `Null`.
    #[must_use]
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }

    /// `None` maps to `Unset`, for optional arguments of partial updates.
    #[must_use]
    pub fn supplied(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Value)
    }

    /// `self` unless it is `Unset`, in which case `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        match self {
            Self::Unset => fallback,
            other => other,
        }
    }

    /// Overwrite with `update` unless `update` is `Unset`.
    pub fn merge(&mut self, update: Self) {
        if !update.is_unset() {
            *self = update;
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            // Unset is normally skipped by the owning struct; write null if not.
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only called when the key is present; a missing key uses Default.
        Option::<T>::deserialize(deserializer).map(|v| v.map_or(Self::Null, Self::Value))
    }
}
