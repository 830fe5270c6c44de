// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dictionary/XML payloads for ad-hoc map-typed events.
//!
//! ```xml
//! <dictionary>
//!   <entry key="symbol" type="System.String">ACME</entry>
//!   <entry key="qty" type="System.Int32">10</entry>
//!   <entry key="note" nil="true"/>
//!   <entry key="venue">
//!     <dictionary>
//!       <entry key="mic" type="System.String">XNAS</entry>
//!     </dictionary>
//!   </entry>
//! </dictionary>
//! ```
//!
//! Entry types resolve only through the primitive whitelist.

use super::whitelist::whitelisted;
use crate::dynamic::{DynamicValue, PrimitiveKind};
use crate::error::{BridgeError, Result};
use crate::schema::escape;
use super::json::parse_datetime;
use chrono::SecondsFormat;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::str::FromStr;
use uuid::Uuid;

const DICTIONARY: &str = "dictionary";
const ENTRY: &str = "entry";

/// Decode a dictionary payload into an ordered [`DynamicValue::Map`].
pub fn decode_dictionary(xml: &str, max_depth: usize) -> Result<DynamicValue> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| BridgeError::Dictionary(format!("malformed XML: {}", e)))?;
    let root = doc.root_element();
    if root.tag_name().name() != DICTIONARY {
        return Err(BridgeError::Dictionary(format!(
            "root element is <{}>, expected <{}>",
            root.tag_name().name(),
            DICTIONARY
        )));
    }
    let value = dictionary(root, 1, max_depth)?;
    log::debug!(
        "[codec] decoded dictionary with {} entr(y/ies)",
        value.as_map().map_or(0, IndexMap::len)
    );
    Ok(value)
}

fn dictionary(node: roxmltree::Node<'_, '_>, depth: usize, max_depth: usize) -> Result<DynamicValue> {
    if depth > max_depth {
        return Err(BridgeError::Dictionary(format!(
            "nesting exceeds max_depth {}",
            max_depth
        )));
    }

    let mut entries = IndexMap::new();
    for entry in node.children().filter(roxmltree::Node::is_element) {
        if entry.tag_name().name() != ENTRY {
            return Err(BridgeError::Dictionary(format!(
                "unexpected <{}> inside <{}>",
                entry.tag_name().name(),
                DICTIONARY
            )));
        }
        let key = entry
            .attribute("key")
            .ok_or_else(|| BridgeError::Dictionary("entry without key attribute".into()))?;
        let value = entry_value(entry, key, depth, max_depth)?;
        if entries.insert(key.to_string(), value).is_some() {
            return Err(BridgeError::Dictionary(format!("duplicate key '{}'", key)));
        }
    }
    Ok(DynamicValue::Map(entries))
}

fn entry_value(
    entry: roxmltree::Node<'_, '_>,
    key: &str,
    depth: usize,
    max_depth: usize,
) -> Result<DynamicValue> {
    if entry.attribute("nil") == Some("true") {
        return Ok(DynamicValue::Null);
    }

    let nested: Vec<_> = entry.children().filter(roxmltree::Node::is_element).collect();
    match (nested.as_slice(), entry.attribute("type")) {
        ([child], None) if child.tag_name().name() == DICTIONARY => {
            dictionary(*child, depth + 1, max_depth)
        }
        ([], Some(type_name)) => {
            let kind = whitelisted(type_name).ok_or_else(|| {
                log::warn!("[codec] refusing dictionary entry '{}' of type {}", key, type_name);
                BridgeError::unknown_type(type_name)
            })?;
            parse_scalar(kind, entry.text().unwrap_or_default()).map_err(|reason| {
                BridgeError::Dictionary(format!("entry '{}': {}", key, reason))
            })
        }
        ([], None) => Err(BridgeError::Dictionary(format!(
            "entry '{}' has neither a type nor a nested dictionary",
            key
        ))),
        _ => Err(BridgeError::Dictionary(format!(
            "entry '{}' must hold scalar text or exactly one nested dictionary",
            key
        ))),
    }
}

/// Parse entry text as `kind`.
fn parse_scalar(kind: PrimitiveKind, text: &str) -> std::result::Result<DynamicValue, String> {
    fn num<T: FromStr>(text: &str, kind: PrimitiveKind) -> std::result::Result<T, String> {
        text.trim()
            .parse()
            .map_err(|_| format!("'{}' is not a valid {}", text, kind.xsd_name()))
    }

    Ok(match kind {
        PrimitiveKind::Bool => match text.trim() {
            "true" | "1" => DynamicValue::Bool(true),
            "false" | "0" => DynamicValue::Bool(false),
            other => return Err(format!("'{}' is not a valid boolean", other)),
        },
        PrimitiveKind::I8 => DynamicValue::I8(num(text, kind)?),
        PrimitiveKind::U8 => DynamicValue::U8(num(text, kind)?),
        PrimitiveKind::I16 => DynamicValue::I16(num(text, kind)?),
        PrimitiveKind::U16 => DynamicValue::U16(num(text, kind)?),
        PrimitiveKind::I32 => DynamicValue::I32(num(text, kind)?),
        PrimitiveKind::U32 => DynamicValue::U32(num(text, kind)?),
        PrimitiveKind::I64 => DynamicValue::I64(num(text, kind)?),
        PrimitiveKind::U64 => DynamicValue::U64(num(text, kind)?),
        PrimitiveKind::F32 => DynamicValue::F32(num(text, kind)?),
        PrimitiveKind::F64 => DynamicValue::F64(num(text, kind)?),
        PrimitiveKind::Decimal => DynamicValue::Decimal(
            Decimal::from_str(text.trim()).map_err(|e| format!("invalid decimal '{}': {}", text, e))?,
        ),
        PrimitiveKind::String => DynamicValue::String(text.to_string()),
        PrimitiveKind::DateTime => DynamicValue::DateTime(
            parse_datetime(text.trim()).map_err(|e| format!("invalid dateTime '{}': {}", text, e))?,
        ),
        PrimitiveKind::Guid => DynamicValue::Guid(
            Uuid::parse_str(text.trim()).map_err(|e| format!("invalid guid '{}': {}", text, e))?,
        ),
        PrimitiveKind::Char => return Err("char has no dictionary type".into()),
    })
}

/// Render a map (or struct) value as a dictionary payload.
pub fn encode_dictionary(value: &DynamicValue) -> Result<String> {
    let mut out = String::new();
    write_dictionary(&mut out, value, "")?;
    Ok(out)
}

fn write_dictionary(out: &mut String, value: &DynamicValue, path: &str) -> Result<()> {
    let entries = match value {
        DynamicValue::Map(entries) | DynamicValue::Struct(entries) => entries,
        other => {
            return Err(BridgeError::Dictionary(format!(
                "{} is a {}, only maps encode as dictionaries",
                if path.is_empty() { "root" } else { path },
                other.kind_name()
            )))
        }
    };

    out.push_str("<dictionary>");
    for (key, entry) in entries {
        let entry_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };
        let key = escape(key);
        match entry {
            DynamicValue::Null => {
                let _ = write!(out, "<entry key=\"{}\" nil=\"true\"/>", key);
            }
            DynamicValue::Map(_) | DynamicValue::Struct(_) => {
                let _ = write!(out, "<entry key=\"{}\">", key);
                write_dictionary(out, entry, &entry_path)?;
                out.push_str("</entry>");
            }
            scalar => {
                let type_name = scalar
                    .primitive_kind()
                    .and_then(|kind| kind.wire_name())
                    .ok_or_else(|| {
                        BridgeError::Dictionary(format!(
                            "entry '{}' of kind {} has no dictionary form",
                            entry_path,
                            scalar.kind_name()
                        ))
                    })?;
                let _ = write!(
                    out,
                    "<entry key=\"{}\" type=\"{}\">{}</entry>",
                    key,
                    type_name,
                    escape(&scalar_text(scalar))
                );
            }
        }
    }
    out.push_str("</dictionary>");
    Ok(())
}

fn scalar_text(value: &DynamicValue) -> String {
    match value {
        DynamicValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        DynamicValue::Guid(g) => g.hyphenated().to_string(),
        DynamicValue::String(s) => s.clone(),
        DynamicValue::Bool(b) => b.to_string(),
        DynamicValue::I8(v) => v.to_string(),
        DynamicValue::U8(v) => v.to_string(),
        DynamicValue::I16(v) => v.to_string(),
        DynamicValue::U16(v) => v.to_string(),
        DynamicValue::I32(v) => v.to_string(),
        DynamicValue::U32(v) => v.to_string(),
        DynamicValue::I64(v) => v.to_string(),
        DynamicValue::U64(v) => v.to_string(),
        DynamicValue::F32(v) => v.to_string(),
        DynamicValue::F64(v) => v.to_string(),
        DynamicValue::Decimal(v) => v.to_string(),
        _ => String::new(),
    }
}
