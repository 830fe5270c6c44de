// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value types.

use super::PrimitiveKind;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A dynamic value that can hold any synthesized event shape.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    // Primitives
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(char),
    String(String),
    DateTime(DateTime<Utc>),
    Guid(Uuid),

    // Composites
    /// Record members in layout order.
    Struct(IndexMap<String, DynamicValue>),
    Sequence(Vec<DynamicValue>),
    /// Ad-hoc dictionary (insertion order kept).
    Map(IndexMap<String, DynamicValue>),

    // Special
    Null,
}

impl DynamicValue {
    /// Empty struct value.
    pub fn empty_struct() -> Self {
        Self::Struct(IndexMap::new())
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Primitive kind of a scalar value.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::I8(_) => PrimitiveKind::I8,
            Self::U8(_) => PrimitiveKind::U8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::U16(_) => PrimitiveKind::U16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::U32(_) => PrimitiveKind::U32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Decimal(_) => PrimitiveKind::Decimal,
            Self::Char(_) => PrimitiveKind::Char,
            Self::String(_) => PrimitiveKind::String,
            Self::DateTime(_) => PrimitiveKind::DateTime,
            Self::Guid(_) => PrimitiveKind::Guid,
            Self::Struct(_) | Self::Sequence(_) | Self::Map(_) | Self::Null => return None,
        };
        Some(kind)
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self.primitive_kind() {
            Some(kind) => kind.xsd_name(),
            None => match self {
                Self::Struct(_) => "struct",
                Self::Sequence(_) => "sequence",
                Self::Map(_) => "map",
                _ => "null",
            },
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any integral value to i64 when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::U8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::U16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::U32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            Self::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get as f64 (floats only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as sequence.
    pub fn as_sequence(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as map (dictionary payloads).
    pub fn as_map(&self) -> Option<&IndexMap<String, DynamicValue>> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get struct member or map entry.
    pub fn get_field(&self, name: &str) -> Option<&DynamicValue> {
        match self {
            Self::Struct(fields) | Self::Map(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Try to get mutable struct member or map entry.
    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut DynamicValue> {
        match self {
            Self::Struct(fields) | Self::Map(fields) => fields.get_mut(name),
            _ => None,
        }
    }

    /// Set struct member or map entry.
    pub fn set_field(&mut self, name: impl Into<String>, value: DynamicValue) -> bool {
        match self {
            Self::Struct(fields) | Self::Map(fields) => {
                fields.insert(name.into(), value);
                true
            }
            _ => false,
        }
    }
}

// Conversion traits
macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for DynamicValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_scalar!(bool, Bool);
impl_from_scalar!(i8, I8);
impl_from_scalar!(u8, U8);
impl_from_scalar!(i16, I16);
impl_from_scalar!(u16, U16);
impl_from_scalar!(i32, I32);
impl_from_scalar!(u32, U32);
impl_from_scalar!(i64, I64);
impl_from_scalar!(u64, U64);
impl_from_scalar!(f32, F32);
impl_from_scalar!(f64, F64);
impl_from_scalar!(Decimal, Decimal);
impl_from_scalar!(char, Char);
impl_from_scalar!(String, String);
impl_from_scalar!(DateTime<Utc>, DateTime);
impl_from_scalar!(Uuid, Guid);

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_values() {
        let v = DynamicValue::from(42i32);
        assert_eq!(v.as_i32(), Some(42));
        assert_eq!(v.as_i64(), Some(42));
        assert_eq!(v.primitive_kind(), Some(PrimitiveKind::I32));

        let v = DynamicValue::from(std::f64::consts::PI);
        assert_eq!(v.as_f64(), Some(std::f64::consts::PI));

        let v = DynamicValue::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(v.kind_name(), "string");
    }

    #[test]
    fn test_u64_widening_is_checked() {
        assert_eq!(DynamicValue::U64(7).as_i64(), Some(7));
        assert_eq!(DynamicValue::U64(u64::MAX).as_i64(), None);
    }

    #[test]
    fn test_struct_keeps_member_order() {
        let mut v = DynamicValue::empty_struct();
        v.set_field("zeta", 1i32.into());
        v.set_field("alpha", 2i32.into());

        let DynamicValue::Struct(fields) = &v else {
            panic!("expected struct");
        };
        let names: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(v.get_field("alpha").and_then(|f| f.as_i32()), Some(2));
        assert!(v.get_field("missing").is_none());
    }

    #[test]
    fn test_option_maps_to_null() {
        assert!(DynamicValue::from(None::<i32>).is_null());
        assert_eq!(DynamicValue::from(Some(3u8)), DynamicValue::U8(3));
    }

    #[test]
    fn test_set_field_on_scalar_fails() {
        let mut v = DynamicValue::from(1i32);
        assert!(!v.set_field("x", DynamicValue::Null));
    }
}
