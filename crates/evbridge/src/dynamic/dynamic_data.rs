// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicData container for runtime data manipulation.

use crate::codec::json;
use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor, TypeKind};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors for DynamicData operations.
#[derive(Debug, Error)]
pub enum DynamicDataError {
    #[error("member not found: {0}")]
    FieldNotFound(String),

    #[error("type mismatch at {path}: expected {expected}, got {got}")]
    TypeMismatch {
        path: String,
        expected: String,
        got: String,
    },

    #[error("invalid operation for type: {0}")]
    InvalidOperation(String),

    #[error("index out of bounds: {index} >= {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    #[error("typed view failed: {0}")]
    TypedView(#[from] serde_json::Error),
}

impl DynamicDataError {
    fn mismatch(path: &str, expected: impl Into<String>, got: &DynamicValue) -> Self {
        Self::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            got: got.kind_name().to_string(),
        }
    }
}

/// Dynamic data container with runtime type checking.
///
/// This is the in-process representation of a synthesized event type: the
/// descriptor carries the shape, the value carries the data.
#[derive(Debug, Clone)]
pub struct DynamicData {
    /// Type descriptor.
    descriptor: Arc<TypeDescriptor>,
    /// Actual value.
    value: DynamicValue,
}

impl DynamicData {
    /// Create new DynamicData with default values.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        let value = Self::default_value(descriptor);
        Self {
            descriptor: Arc::clone(descriptor),
            value,
        }
    }

    /// Create from existing value, checking it against the descriptor.
    pub fn from_value(
        descriptor: &Arc<TypeDescriptor>,
        value: DynamicValue,
    ) -> Result<Self, DynamicDataError> {
        Self::validate(descriptor, &value, &descriptor.name)?;
        Ok(Self {
            descriptor: Arc::clone(descriptor),
            value,
        })
    }

    /// Get the type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Get the type name.
    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    /// Get the underlying value.
    pub fn value(&self) -> &DynamicValue {
        &self.value
    }

    /// Get mutable reference to value.
    pub fn value_mut(&mut self) -> &mut DynamicValue {
        &mut self.value
    }

    /// Into inner value.
    pub fn into_value(self) -> DynamicValue {
        self.value
    }

    /// Get a member value by name.
    pub fn get<T: FromDynamicValue>(&self, name: &str) -> Result<T, DynamicDataError> {
        let member_value = self.get_field(name)?;
        T::from_dynamic(member_value)
    }

    /// Set a member value by name.
    ///
    /// Primitive members only accept values of their declared kind; `Null`
    /// is accepted for optional members.
    pub fn set<T: IntoDynamicValue>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<(), DynamicDataError> {
        let member = self
            .descriptor
            .member(name)
            .ok_or_else(|| DynamicDataError::FieldNotFound(name.to_string()))?;

        let dyn_value = value.into_dynamic();
        if !(dyn_value.is_null() && member.optional) {
            Self::validate(&member.type_desc, &dyn_value, name)?;
        }

        match &mut self.value {
            DynamicValue::Struct(fields) => {
                fields.insert(name.to_string(), dyn_value);
                Ok(())
            }
            _ => Err(DynamicDataError::InvalidOperation(
                "set requires struct type".into(),
            )),
        }
    }

    /// Get member by name.
    pub fn get_field(&self, name: &str) -> Result<&DynamicValue, DynamicDataError> {
        if self.descriptor.member(name).is_none() {
            return Err(DynamicDataError::FieldNotFound(name.to_string()));
        }

        match &self.value {
            DynamicValue::Struct(fields) => fields
                .get(name)
                .ok_or_else(|| DynamicDataError::FieldNotFound(name.to_string())),
            _ => Err(DynamicDataError::InvalidOperation(
                "get_field requires struct type".into(),
            )),
        }
    }

    /// Get sequence element by index.
    pub fn get_element(&self, index: usize) -> Result<&DynamicValue, DynamicDataError> {
        match &self.value {
            DynamicValue::Sequence(seq) => seq.get(index).ok_or(DynamicDataError::IndexOutOfBounds {
                index,
                length: seq.len(),
            }),
            _ => Err(DynamicDataError::InvalidOperation(
                "get_element requires sequence type".into(),
            )),
        }
    }

    /// Push element to sequence.
    pub fn push_element(&mut self, value: DynamicValue) -> Result<(), DynamicDataError> {
        let element_type = self.descriptor.element_type().ok_or_else(|| {
            DynamicDataError::InvalidOperation("push_element requires sequence type".into())
        })?;
        Self::validate(element_type, &value, "[]")?;

        match &mut self.value {
            DynamicValue::Sequence(seq) => {
                seq.push(value);
                Ok(())
            }
            _ => Err(DynamicDataError::InvalidOperation(
                "push_element requires sequence type".into(),
            )),
        }
    }

    /// Get sequence length.
    pub fn len(&self) -> Result<usize, DynamicDataError> {
        match &self.value {
            DynamicValue::Sequence(seq) => Ok(seq.len()),
            _ => Err(DynamicDataError::InvalidOperation(
                "len requires sequence type".into(),
            )),
        }
    }

    /// Check if sequence is empty.
    pub fn is_empty(&self) -> Result<bool, DynamicDataError> {
        self.len().map(|l| l == 0)
    }

    /// Iterate over members in layout order (for structs).
    pub fn fields(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        match &self.value {
            DynamicValue::Struct(fields) => {
                Box::new(fields.iter().map(|(k, v)| (k.as_str(), v))) as Box<dyn Iterator<Item = _>>
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Iterate over elements (for sequences).
    pub fn elements(&self) -> impl Iterator<Item = &DynamicValue> {
        match &self.value {
            DynamicValue::Sequence(seq) => Box::new(seq.iter()) as Box<dyn Iterator<Item = _>>,
            _ => Box::new(std::iter::empty()),
        }
    }

    /// JSON rendering of the value (the `eventData` wire shape).
    pub fn to_json(&self) -> serde_json::Value {
        json::encode_value(&self.value)
    }

    /// Typed view: deserialize the record into a native Rust type.
    ///
    /// Works for any `DeserializeOwned` type whose serde shape matches the
    /// synthesized layout, including `Reflect` contracts compiled into the
    /// receiving process.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, DynamicDataError> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    /// Check a value against a descriptor.
    ///
    /// References are not followed; the codec checks them on decode.
    fn validate(
        desc: &TypeDescriptor,
        value: &DynamicValue,
        path: &str,
    ) -> Result<(), DynamicDataError> {
        match (&desc.kind, value) {
            (TypeKind::Primitive(kind), v) => {
                if v.primitive_kind() == Some(*kind) {
                    Ok(())
                } else {
                    Err(DynamicDataError::mismatch(path, kind.xsd_name(), v))
                }
            }
            (TypeKind::Struct(members), DynamicValue::Struct(fields)) => {
                if let Some(unknown) = fields.keys().find(|k| desc.member(k).is_none()) {
                    return Err(DynamicDataError::FieldNotFound(format!("{path}.{unknown}")));
                }
                for member in members {
                    let member_path = format!("{path}.{}", member.name);
                    match fields.get(&member.name) {
                        None | Some(DynamicValue::Null) if member.optional => {}
                        Some(v) => Self::validate(&member.type_desc, v, &member_path)?,
                        None => return Err(DynamicDataError::FieldNotFound(member_path)),
                    }
                }
                Ok(())
            }
            (TypeKind::Sequence(seq), DynamicValue::Sequence(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    Self::validate(&seq.element_type, item, &format!("{path}[{idx}]"))?;
                }
                Ok(())
            }
            (TypeKind::Map, DynamicValue::Map(_)) | (TypeKind::Reference(_), _) => Ok(()),
            (TypeKind::Struct(_), v) => Err(DynamicDataError::mismatch(path, "struct", v)),
            (TypeKind::Sequence(_), v) => Err(DynamicDataError::mismatch(path, "sequence", v)),
            (TypeKind::Map, v) => Err(DynamicDataError::mismatch(path, "map", v)),
        }
    }

    /// Create default value for a type.
    fn default_value(desc: &TypeDescriptor) -> DynamicValue {
        match &desc.kind {
            TypeKind::Primitive(p) => Self::default_primitive(*p),
            TypeKind::Struct(members) => {
                let mut map = IndexMap::with_capacity(members.len());
                for member in members {
                    let value = if member.optional {
                        DynamicValue::Null
                    } else {
                        Self::default_value(&member.type_desc)
                    };
                    map.insert(member.name.clone(), value);
                }
                DynamicValue::Struct(map)
            }
            TypeKind::Sequence(_) => DynamicValue::Sequence(Vec::new()),
            TypeKind::Map => DynamicValue::Map(IndexMap::new()),
            TypeKind::Reference(_) => DynamicValue::Null,
        }
    }

    /// Create default value for a primitive.
    fn default_primitive(kind: PrimitiveKind) -> DynamicValue {
        match kind {
            PrimitiveKind::Bool => DynamicValue::Bool(false),
            PrimitiveKind::I8 => DynamicValue::I8(0),
            PrimitiveKind::U8 => DynamicValue::U8(0),
            PrimitiveKind::I16 => DynamicValue::I16(0),
            PrimitiveKind::U16 => DynamicValue::U16(0),
            PrimitiveKind::I32 => DynamicValue::I32(0),
            PrimitiveKind::U32 => DynamicValue::U32(0),
            PrimitiveKind::I64 => DynamicValue::I64(0),
            PrimitiveKind::U64 => DynamicValue::U64(0),
            PrimitiveKind::F32 => DynamicValue::F32(0.0),
            PrimitiveKind::F64 => DynamicValue::F64(0.0),
            PrimitiveKind::Decimal => DynamicValue::Decimal(Decimal::ZERO),
            PrimitiveKind::Char => DynamicValue::Char('\0'),
            PrimitiveKind::String => DynamicValue::String(String::new()),
            PrimitiveKind::DateTime => DynamicValue::DateTime(DateTime::<Utc>::UNIX_EPOCH),
            PrimitiveKind::Guid => DynamicValue::Guid(Uuid::nil()),
        }
    }
}

impl PartialEq for DynamicData {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name && self.value == other.value
    }
}

/// Trait for converting from DynamicValue.
pub trait FromDynamicValue: Sized {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError>;
}

/// Trait for converting to DynamicValue.
pub trait IntoDynamicValue {
    fn into_dynamic(self) -> DynamicValue;
}

macro_rules! impl_from_dynamic {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromDynamicValue for $ty {
            fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
                match value {
                    DynamicValue::$variant(v) => Ok(v.clone()),
                    other => Err(DynamicDataError::mismatch("value", $name, other)),
                }
            }
        }

        impl IntoDynamicValue for $ty {
            fn into_dynamic(self) -> DynamicValue {
                DynamicValue::$variant(self)
            }
        }
    };
}

impl_from_dynamic!(bool, Bool, "boolean");
impl_from_dynamic!(i8, I8, "byte");
impl_from_dynamic!(u8, U8, "unsignedByte");
impl_from_dynamic!(i16, I16, "short");
impl_from_dynamic!(u16, U16, "unsignedShort");
impl_from_dynamic!(i32, I32, "int");
impl_from_dynamic!(u32, U32, "unsignedInt");
impl_from_dynamic!(i64, I64, "long");
impl_from_dynamic!(u64, U64, "unsignedLong");
impl_from_dynamic!(f32, F32, "float");
impl_from_dynamic!(f64, F64, "double");
impl_from_dynamic!(Decimal, Decimal, "decimal");
impl_from_dynamic!(char, Char, "char");
impl_from_dynamic!(String, String, "string");
impl_from_dynamic!(DateTime<Utc>, DateTime, "dateTime");
impl_from_dynamic!(Uuid, Guid, "guid");

impl<T: FromDynamicValue> FromDynamicValue for Option<T> {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        match value {
            DynamicValue::Null => Ok(None),
            other => T::from_dynamic(other).map(Some),
        }
    }
}

impl IntoDynamicValue for &str {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::String(self.to_string())
    }
}

impl IntoDynamicValue for DynamicValue {
    fn into_dynamic(self) -> DynamicValue {
        self
    }
}

impl<T: IntoDynamicValue> IntoDynamicValue for Option<T> {
    fn into_dynamic(self) -> DynamicValue {
        self.map_or(DynamicValue::Null, IntoDynamicValue::into_dynamic)
    }
}
