// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Event codec: native values ↔ schema-tagged wire envelopes.
//!
//! Encoding looks up the contract of the value's type (or of its nearest
//! contract base) and writes `{ "eventType", "eventData" }`. Decoding
//! resolves `eventType` against the [`TypeRegistry`] first and the fixed
//! primitive [`whitelist`] second. Anything else is refused before any
//! instance is built; the configured [`DecodeMode`] decides whether the
//! refusal is an error or an empty result.
//!
//! # Example
//!
//! ```rust
//! use evbridge::codec::EventCodec;
//! use evbridge::config::CodecConfig;
//! use evbridge::registry::TypeRegistry;
//! use std::sync::Arc;
//!
//! let codec = EventCodec::new(Arc::new(TypeRegistry::new()), CodecConfig::default());
//!
//! let event = codec
//!     .deserialize(br#"{"eventType":"System.Int32","eventData":42}"#, "System.Int32")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(event.value().as_i32(), Some(42));
//!
//! let refused = codec.decode_envelope(br#"{"eventType":"System.IO.File","eventData":{}}"#);
//! assert!(refused.unwrap_err().is_unknown_type());
//! ```

mod content;
mod dictionary;
mod envelope;
pub(crate) mod json;
pub mod whitelist;

pub use content::{decode_message, ContentType, DecodedPayload};
pub use dictionary::{decode_dictionary, encode_dictionary};
pub use envelope::EventEnvelope;

use crate::config::{CodecConfig, DecodeMode};
use crate::contract::{NativeType, Reflect, TypeRef};
use crate::dynamic::{DynamicData, NativeTypeHandle, TypeDescriptor};
use crate::error::{BridgeError, Result};
use crate::registry::TypeRegistry;
use dashmap::DashMap;
use json::DecodeContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

/// Per-native-type encoding plan.
#[derive(Debug)]
struct ContractCodec {
    contract: &'static NativeType,
    event_type: String,
    /// Wire names of the contract's members, base chain included.
    members: HashSet<&'static str>,
}

impl ContractCodec {
    fn build(native: &'static NativeType) -> Result<Self> {
        let contract = native.nearest_contract().ok_or_else(|| {
            BridgeError::serialization(
                native.rust_name,
                "neither the type nor any of its bases is an event contract",
            )
        })?;
        let event_type = contract
            .qname()
            .map(|name| name.to_string())
            .ok_or_else(|| BridgeError::serialization(native.rust_name, "contract has no name"))?;

        let mut members = HashSet::new();
        let mut current = Some(contract);
        while let Some(ty) = current {
            members.extend(ty.members.iter().map(|m| m.name));
            current = ty.base_type();
        }
        if !std::ptr::eq(contract, native) {
            log::debug!(
                "[codec] {} encodes through contract base {}",
                native.rust_name,
                contract.rust_name
            );
        }
        Ok(Self {
            contract,
            event_type,
            members,
        })
    }

    /// Keep only contract members.
    fn project(&self, value: Value) -> Result<Value> {
        match value {
            Value::Object(object) => Ok(Value::Object(
                object
                    .into_iter()
                    .filter(|(key, _)| self.members.contains(key.as_str()))
                    .collect::<Map<_, _>>(),
            )),
            other => Err(BridgeError::serialization(
                self.contract.rust_name,
                format!("serde produced {} instead of an object", other),
            )),
        }
    }
}

/// Reject missing or null values in non-optional members, nested contracts
/// included.
///
/// serde writes non-finite floats as `null`, which no importer accepts for a
/// required member.
fn require_members(
    ty: &'static NativeType,
    value: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
) -> std::result::Result<(), String> {
    if depth > max_depth {
        return Err(format!("{}: nesting exceeds {}", path, max_depth));
    }
    let Value::Object(object) = value else {
        return Err(format!("{}: expected an object", path));
    };
    let mut current = Some(ty);
    while let Some(ty) = current {
        for member in &ty.members {
            let member_path = format!("{}.{}", path, member.name);
            match object.get(member.name) {
                None | Some(Value::Null) if member.optional => {}
                None => return Err(format!("{}: required member is missing", member_path)),
                Some(Value::Null) => return Err(format!("{}: required member is null", member_path)),
                Some(v) => require_value(&member.type_ref, v, &member_path, depth + 1, max_depth)?,
            }
        }
        current = ty.base_type();
    }
    Ok(())
}

fn require_value(
    type_ref: &TypeRef,
    value: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
) -> std::result::Result<(), String> {
    match (type_ref, value) {
        (_, Value::Null) => Err(format!("{}: value is null", path)),
        (TypeRef::Primitive(_), _) => Ok(()),
        (TypeRef::Sequence(inner), Value::Array(items)) => {
            items.iter().enumerate().try_for_each(|(i, item)| {
                require_value(inner, item, &format!("{}[{}]", path, i), depth + 1, max_depth)
            })
        }
        (TypeRef::Sequence(_), _) => Err(format!("{}: expected an array", path)),
        (TypeRef::Native(native), _) => require_members(native(), value, path, depth, max_depth),
    }
}

/// Encoder/decoder for wire envelopes.
pub struct EventCodec {
    registry: Arc<TypeRegistry>,
    config: CodecConfig,
    contracts: DashMap<TypeId, Arc<ContractCodec>>,
}

impl EventCodec {
    pub fn new(registry: Arc<TypeRegistry>, config: CodecConfig) -> Self {
        Self {
            registry,
            config,
            contracts: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Number of native types with a cached encoding plan.
    pub fn cached_contracts(&self) -> usize {
        self.contracts.len()
    }

    fn contract_codec<T: Reflect + 'static>(&self) -> Result<Arc<ContractCodec>> {
        let key = TypeId::of::<T>();
        if let Some(codec) = self.contracts.get(&key) {
            return Ok(Arc::clone(codec.value()));
        }
        // Failures are not cached; the type may never become encodable but
        // the lookup is cheap.
        let codec = Arc::new(ContractCodec::build(T::native_type())?);
        Ok(Arc::clone(self.contracts.entry(key).or_insert(codec).value()))
    }

    /// Encode a native value as a wire envelope.
    ///
    /// Only contract members travel; a type without a contract of its own is
    /// encoded as its nearest contract base.
    pub fn serialize<T: Reflect + Serialize + 'static>(&self, value: &T) -> Result<Vec<u8>> {
        let codec = self.contract_codec::<T>()?;
        let data = serde_json::to_value(value)
            .map_err(|e| BridgeError::serialization(T::native_type().rust_name, e.to_string()))?;
        let projected = codec.project(data)?;
        require_members(codec.contract, &projected, "$", 0, self.config.max_depth)
            .map_err(|reason| BridgeError::serialization(codec.event_type.as_str(), reason))?;
        let envelope = EventEnvelope::new(codec.event_type.clone(), projected);
        log::trace!("[codec] serialized {}", codec.event_type);
        Ok(envelope.to_vec(self.config.pretty)?)
    }

    /// Encode a dynamic record.
    ///
    /// The record's descriptor must be the one bound in the registry under its
    /// name (or structurally equal to it), or be a whitelisted primitive.
    pub fn serialize_dynamic(&self, data: &DynamicData) -> Result<Vec<u8>> {
        let descriptor = data.descriptor();
        let event_type = match &descriptor.qname {
            Some(name) => match self.registry.binding(name) {
                Some(binding)
                    if Arc::ptr_eq(descriptor, &binding.handle) || **descriptor == *binding.handle =>
                {
                    name.to_string()
                }
                Some(_) => {
                    return Err(BridgeError::serialization(
                        descriptor.name.as_str(),
                        format!("record shape differs from the type bound as {}", name),
                    ))
                }
                None => {
                    return Err(BridgeError::serialization(
                        descriptor.name.as_str(),
                        format!("{} is not bound in the registry", name),
                    ))
                }
            },
            None => data
                .value()
                .primitive_kind()
                .and_then(|kind| kind.wire_name())
                .filter(|name| whitelist::whitelisted(name).is_some())
                .map(str::to_string)
                .ok_or_else(|| {
                    BridgeError::serialization(
                        descriptor.name.as_str(),
                        "record has no schema name and is not a whitelisted primitive",
                    )
                })?,
        };
        let envelope = EventEnvelope::new(event_type, data.to_json());
        Ok(envelope.to_vec(self.config.pretty)?)
    }

    /// Decode an envelope that must carry `declared` as its event type.
    ///
    /// `Ok(None)` only in lenient mode, for an unresolvable type.
    pub fn deserialize(&self, bytes: &[u8], declared: &str) -> Result<Option<DynamicData>> {
        let envelope = EventEnvelope::from_slice(bytes)?;
        if envelope.event_type != declared {
            return Err(BridgeError::serialization(
                declared,
                format!("envelope carries {}", envelope.event_type),
            ));
        }
        self.decode(&envelope)
    }

    /// Decode an envelope using its own event type.
    pub fn decode_envelope(&self, bytes: &[u8]) -> Result<Option<DynamicData>> {
        let envelope = EventEnvelope::from_slice(bytes)?;
        self.decode(&envelope)
    }

    /// Decode straight into a native contract type.
    ///
    /// The envelope must name `T`'s contract.
    pub fn decode_typed<T: Reflect + DeserializeOwned + 'static>(&self, bytes: &[u8]) -> Result<T> {
        let codec = self.contract_codec::<T>()?;
        let envelope = EventEnvelope::from_slice(bytes)?;
        if envelope.event_type != codec.event_type {
            return Err(BridgeError::serialization(
                codec.event_type.as_str(),
                format!("envelope carries {}", envelope.event_type),
            ));
        }
        serde_json::from_value(envelope.event_data)
            .map_err(|e| BridgeError::serialization(codec.event_type.as_str(), e.to_string()))
    }

    /// Native handle for a wire type name.
    ///
    /// Registry first, whitelist second. Unresolvable names are logged and
    /// handled per [`DecodeMode`].
    pub fn resolve_type(&self, name: &str) -> Result<Option<NativeTypeHandle>> {
        if let Some(handle) = self.registry.resolve_wire_name(name) {
            return Ok(Some(handle));
        }
        if let Some(kind) = whitelist::whitelisted(name) {
            return Ok(Some(Arc::new(TypeDescriptor::primitive(kind))));
        }
        log::warn!("[codec] refusing unresolvable event type {}", name);
        match self.config.mode {
            DecodeMode::Strict => Err(BridgeError::unknown_type(name)),
            DecodeMode::Lenient => Ok(None),
        }
    }

    /// Route a transport payload by content type.
    pub fn decode_message(&self, content_type: &str, payload: &str) -> Result<DecodedPayload> {
        decode_message(content_type, payload, self.config.max_depth)
    }

    fn decode(&self, envelope: &EventEnvelope) -> Result<Option<DynamicData>> {
        let Some(handle) = self.resolve_type(&envelope.event_type)? else {
            return Ok(None);
        };
        let ctx = DecodeContext {
            registry: &self.registry,
            max_depth: self.config.max_depth,
            type_name: &envelope.event_type,
        };
        let value = ctx.decode(&envelope.event_data, &handle)?;
        log::trace!("[codec] decoded {}", envelope.event_type);
        Ok(Some(DynamicData::from_value(&handle, value)?))
    }
}

impl std::fmt::Debug for EventCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCodec")
            .field("config", &self.config)
            .field("registered_types", &self.registry.len())
            .field("cached_contracts", &self.contracts.len())
            .finish()
    }
}
