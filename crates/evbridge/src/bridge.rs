// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One-stop facade for a proxy host.
//!
//! Owns the registry shared by import and decode, the event codec and the
//! exporter. Every proxy on a host should use one `SchemaBridge` (or at least
//! one `Arc<TypeRegistry>`), so that a type imported from a remote schema is
//! the same handle everywhere.

use crate::codec::{DecodedPayload, EventCodec};
use crate::config::BridgeConfig;
use crate::contract::Reflect;
use crate::dynamic::DynamicData;
use crate::error::Result;
use crate::export::{ExportedSchema, SchemaExporter};
use crate::registry::TypeRegistry;
use crate::schema::{SchemaModel, SchemaSet};
use crate::signature::StructuralSignature;
use crate::synth::{ImportOutcome, TypeSynthesizer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Schema import/export plus event encoding over a shared registry.
#[derive(Debug)]
pub struct SchemaBridge {
    registry: Arc<TypeRegistry>,
    codec: EventCodec,
    exporter: SchemaExporter,
    config: BridgeConfig,
}

impl SchemaBridge {
    /// Bridge with a fresh registry and default configuration.
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self::with_registry(Arc::new(TypeRegistry::new()), config)
    }

    /// Bridge over an existing registry.
    pub fn with_registry(registry: Arc<TypeRegistry>, config: BridgeConfig) -> Self {
        Self {
            codec: EventCodec::new(Arc::clone(&registry), config.codec.clone()),
            exporter: SchemaExporter::new(config.export.clone()),
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn codec(&self) -> &EventCodec {
        &self.codec
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Import every top-level element of a model.
    pub fn import_schema(&self, model: &SchemaModel) -> Result<ImportOutcome> {
        TypeSynthesizer::new(&self.registry).import(model)
    }

    /// Parse XSD documents as one set and import them.
    pub fn import_xsd<S: AsRef<str>>(&self, documents: &[S]) -> Result<ImportOutcome> {
        let model = SchemaSet::parse(documents)?.build()?;
        self.import_schema(&model)
    }

    /// Export contract `T` as XML Schema.
    pub fn export<T: Reflect>(&self) -> Result<ExportedSchema> {
        self.exporter.export::<T>()
    }

    /// Structural signature of contract `T`, as an importer would compute it.
    pub fn signature_of<T: Reflect>(&self) -> Result<StructuralSignature> {
        self.export::<T>()?.signature()
    }

    pub fn serialize<T: Reflect + Serialize + 'static>(&self, value: &T) -> Result<Vec<u8>> {
        self.codec.serialize(value)
    }

    pub fn serialize_dynamic(&self, data: &DynamicData) -> Result<Vec<u8>> {
        self.codec.serialize_dynamic(data)
    }

    pub fn deserialize(&self, bytes: &[u8], declared: &str) -> Result<Option<DynamicData>> {
        self.codec.deserialize(bytes, declared)
    }

    pub fn decode_envelope(&self, bytes: &[u8]) -> Result<Option<DynamicData>> {
        self.codec.decode_envelope(bytes)
    }

    pub fn decode_typed<T: Reflect + DeserializeOwned + 'static>(&self, bytes: &[u8]) -> Result<T> {
        self.codec.decode_typed(bytes)
    }

    pub fn decode_message(&self, content_type: &str, payload: &str) -> Result<DecodedPayload> {
        self.codec.decode_message(content_type, payload)
    }
}

impl Default for SchemaBridge {
    fn default() -> Self {
        Self::new()
    }
}
