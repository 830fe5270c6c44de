// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON ↔ [`DynamicValue`] conversion.
//!
//! Decoding is descriptor-driven: every value is checked against the shape it
//! claims to have. Decimals travel as strings to keep precision, date-times
//! as RFC 3339 (date-only values are read at midnight UTC), GUIDs in
//! hyphenated form.

use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::error::{BridgeError, Result};
use crate::registry::TypeRegistry;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::str::FromStr;
use uuid::Uuid;

/// Parse an `xs:dateTime` (RFC 3339) or an `xs:date`, the latter at
/// midnight UTC.
pub(crate) fn parse_datetime(text: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(err) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::default()).and_utc())
            .map_err(|_| err),
    }
}

/// Encode a value in its wire JSON shape.
pub(crate) fn encode_value(value: &DynamicValue) -> Value {
    match value {
        DynamicValue::Bool(v) => Value::Bool(*v),
        DynamicValue::I8(v) => Value::from(*v),
        DynamicValue::U8(v) => Value::from(*v),
        DynamicValue::I16(v) => Value::from(*v),
        DynamicValue::U16(v) => Value::from(*v),
        DynamicValue::I32(v) => Value::from(*v),
        DynamicValue::U32(v) => Value::from(*v),
        DynamicValue::I64(v) => Value::from(*v),
        DynamicValue::U64(v) => Value::from(*v),
        DynamicValue::F32(v) => float(f64::from(*v)),
        DynamicValue::F64(v) => float(*v),
        DynamicValue::Decimal(v) => Value::String(v.to_string()),
        DynamicValue::Char(v) => Value::String(v.to_string()),
        DynamicValue::String(v) => Value::String(v.clone()),
        DynamicValue::DateTime(v) => Value::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        DynamicValue::Guid(v) => Value::String(v.hyphenated().to_string()),
        DynamicValue::Struct(fields) | DynamicValue::Map(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect::<Map<String, Value>>(),
        ),
        DynamicValue::Sequence(items) => Value::Array(items.iter().map(encode_value).collect()),
        DynamicValue::Null => Value::Null,
    }
}

/// Non-finite floats have no JSON form.
fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// Shared state of one decode.
pub(crate) struct DecodeContext<'a> {
    pub registry: &'a TypeRegistry,
    pub max_depth: usize,
    /// Root type name, reported in errors.
    pub type_name: &'a str,
}

impl DecodeContext<'_> {
    fn fail(&self, path: &str, reason: impl std::fmt::Display) -> BridgeError {
        BridgeError::serialization(self.type_name, format!("{}: {}", path, reason))
    }

    fn mismatch(&self, path: &str, expected: &str, got: &Value) -> BridgeError {
        self.fail(path, format!("expected {}, got {}", expected, json_kind(got)))
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(self.fail(path, format!("nesting exceeds max_depth {}", self.max_depth)));
        }
        Ok(())
    }

    /// Decode `json` as an instance of `desc`.
    pub fn decode(&self, json: &Value, desc: &TypeDescriptor) -> Result<DynamicValue> {
        self.value(json, desc, "$", 0)
    }

    fn value(&self, json: &Value, desc: &TypeDescriptor, path: &str, depth: usize) -> Result<DynamicValue> {
        match &desc.kind {
            TypeKind::Primitive(kind) => self.primitive(json, *kind, path),
            TypeKind::Struct(members) => {
                self.check_depth(path, depth)?;
                let Value::Object(object) = json else {
                    return Err(self.mismatch(path, "object", json));
                };
                let mut fields = IndexMap::with_capacity(members.len());
                for member in members {
                    let member_path = format!("{}.{}", path, member.name);
                    let value = match object.get(&member.name) {
                        None | Some(Value::Null) if member.optional => DynamicValue::Null,
                        None => return Err(self.fail(&member_path, "required member is missing")),
                        Some(Value::Null) => return Err(self.fail(&member_path, "required member is null")),
                        Some(v) => self.value(v, &member.type_desc, &member_path, depth + 1)?,
                    };
                    fields.insert(member.name.clone(), value);
                }
                for key in object.keys().filter(|k| desc.member(k).is_none()) {
                    log::debug!("[codec] ignoring unknown member {}.{}", path, key);
                }
                Ok(DynamicValue::Struct(fields))
            }
            TypeKind::Sequence(seq) => {
                self.check_depth(path, depth)?;
                let Value::Array(items) = json else {
                    return Err(self.mismatch(path, "array", json));
                };
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        self.value(item, &seq.element_type, &format!("{}[{}]", path, idx), depth + 1)
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(DynamicValue::Sequence)
            }
            TypeKind::Map => self.untyped(json, path, depth),
            TypeKind::Reference(name) => {
                let target = self
                    .registry
                    .resolve(name)
                    .ok_or_else(|| self.fail(path, format!("referenced type {} is not bound", name)))?;
                self.value(json, &target, path, depth)
            }
        }
    }

    fn primitive(&self, json: &Value, kind: PrimitiveKind, path: &str) -> Result<DynamicValue> {
        let expected = kind.xsd_name();
        let out_of_range = || self.fail(path, format!("{} out of range for {}", json, expected));

        if kind.is_integer() {
            let Value::Number(n) = json else {
                return Err(self.mismatch(path, expected, json));
            };
            let value = if let Some(i) = n.as_i64() {
                integer_from_i64(kind, i)
            } else if let Some(u) = n.as_u64() {
                (kind == PrimitiveKind::U64).then_some(DynamicValue::U64(u))
            } else {
                return Err(self.mismatch(path, expected, json));
            };
            return value.ok_or_else(out_of_range);
        }

        match (kind, json) {
            (PrimitiveKind::Bool, Value::Bool(b)) => Ok(DynamicValue::Bool(*b)),
            (PrimitiveKind::F64, Value::Number(n)) => n
                .as_f64()
                .map(DynamicValue::F64)
                .ok_or_else(|| self.mismatch(path, expected, json)),
            (PrimitiveKind::F32, Value::Number(n)) => {
                let v = n.as_f64().ok_or_else(|| self.mismatch(path, expected, json))?;
                if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    return Err(out_of_range());
                }
                #[allow(clippy::cast_possible_truncation)]
                let narrowed = v as f32;
                Ok(DynamicValue::F32(narrowed))
            }
            (PrimitiveKind::Decimal, Value::String(s)) => Decimal::from_str(s.trim())
                .map(DynamicValue::Decimal)
                .map_err(|e| self.fail(path, e)),
            (PrimitiveKind::Decimal, Value::Number(n)) => {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .map(DynamicValue::Decimal)
                    .map_err(|e| self.fail(path, e))
            }
            (PrimitiveKind::Char, Value::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(DynamicValue::Char(c)),
                    _ => Err(self.fail(path, "expected a single character")),
                }
            }
            (PrimitiveKind::String, Value::String(s)) => Ok(DynamicValue::String(s.clone())),
            (PrimitiveKind::DateTime, Value::String(s)) => parse_datetime(s)
                .map(DynamicValue::DateTime)
                .map_err(|e| self.fail(path, format!("invalid dateTime '{}': {}", s, e))),
            (PrimitiveKind::Guid, Value::String(s)) => Uuid::parse_str(s)
                .map(DynamicValue::Guid)
                .map_err(|e| self.fail(path, format!("invalid guid '{}': {}", s, e))),
            _ => Err(self.mismatch(path, expected, json)),
        }
    }

    /// Map values carry no descriptor; numbers keep their JSON width.
    fn untyped(&self, json: &Value, path: &str, depth: usize) -> Result<DynamicValue> {
        self.check_depth(path, depth)?;
        Ok(match json {
            Value::Null => DynamicValue::Null,
            Value::Bool(b) => DynamicValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DynamicValue::I64(i)
                } else if let Some(u) = n.as_u64() {
                    DynamicValue::U64(u)
                } else {
                    DynamicValue::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => DynamicValue::String(s.clone()),
            Value::Array(items) => DynamicValue::Sequence(
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| self.untyped(item, &format!("{}[{}]", path, idx), depth + 1))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(object) => DynamicValue::Map(
                object
                    .iter()
                    .map(|(k, v)| {
                        self.untyped(v, &format!("{}.{}", path, k), depth + 1)
                            .map(|v| (k.clone(), v))
                    })
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

fn integer_from_i64(kind: PrimitiveKind, i: i64) -> Option<DynamicValue> {
    Some(match kind {
        PrimitiveKind::I8 => DynamicValue::I8(i8::try_from(i).ok()?),
        PrimitiveKind::U8 => DynamicValue::U8(u8::try_from(i).ok()?),
        PrimitiveKind::I16 => DynamicValue::I16(i16::try_from(i).ok()?),
        PrimitiveKind::U16 => DynamicValue::U16(u16::try_from(i).ok()?),
        PrimitiveKind::I32 => DynamicValue::I32(i32::try_from(i).ok()?),
        PrimitiveKind::U32 => DynamicValue::U32(u32::try_from(i).ok()?),
        PrimitiveKind::I64 => DynamicValue::I64(i),
        PrimitiveKind::U64 => DynamicValue::U64(u64::try_from(i).ok()?),
        _ => return None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
