// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # evbridge - schema/type bridge and event codec
//!
//! Lets two event-processing hosts that share no compiled types exchange
//! typed events. One side exports its event contracts as XML Schema; the
//! other imports the schema and synthesizes equivalent record types at
//! runtime. Events then travel as schema-tagged JSON envelopes and are
//! decoded only into types that were imported or explicitly whitelisted.
//!
//! ## Quick Start
//!
//! ```rust
//! use evbridge::{Reflect, SchemaBridge};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Reflect, Serialize, Deserialize)]
//! #[contract(name = "Quote", namespace = "urn:market")]
//! struct Quote {
//!     #[member]
//!     symbol: String,
//!     #[member]
//!     bid: f64,
//! }
//!
//! # fn main() -> evbridge::Result<()> {
//! // Producer: export the contract.
//! let producer = SchemaBridge::new();
//! let schema = producer.export::<Quote>()?;
//!
//! // Consumer: import the schema, then decode events.
//! let consumer = SchemaBridge::new();
//! consumer.import_xsd(&schema.texts())?;
//!
//! let bytes = producer.serialize(&Quote { symbol: "ACME".into(), bid: 101.5 })?;
//! let event = consumer.decode_envelope(&bytes)?.expect("type is bound");
//! assert_eq!(event.get::<f64>("bid")?, 101.5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SchemaBridge`] | Facade: import, export, encode, decode over one registry |
//! | [`SchemaSet`] / [`SchemaModel`] | XSD parsing and the in-memory schema graph |
//! | [`StructuralSignature`] | Digest of a type's shape, used to detect conflicts |
//! | [`TypeSynthesizer`] | Builds runtime types from a schema |
//! | [`TypeRegistry`] | Process-wide name → type bindings, lock-free reads |
//! | [`SchemaExporter`] | Native contracts → XML Schema |
//! | [`EventCodec`] | Wire envelopes, whitelist enforcement |

// `#[derive(Reflect)]` expands to `::evbridge::...` paths.
extern crate self as evbridge;

pub mod bridge;
pub mod codec;
pub mod config;
pub mod contract;
pub mod dynamic;
pub mod error;
pub mod export;
pub mod registry;
pub mod schema;
pub mod signature;
pub mod synth;

pub use bridge::SchemaBridge;
pub use codec::{ContentType, DecodedPayload, EventCodec, EventEnvelope};
pub use config::{BridgeConfig, CodecConfig, ConfigError, DecodeMode, ExportConfig};
pub use contract::{ContractInfo, NativeType, Reflect};
pub use dynamic::{DynamicData, DynamicValue, NativeTypeHandle, TypeDescriptor};
pub use error::{BridgeError, Result};
pub use export::{ExportedSchema, SchemaExporter};
pub use registry::{NativeTypeBinding, TypeRegistry};
pub use schema::{QualifiedName, SchemaError, SchemaModel, SchemaSet};
pub use signature::StructuralSignature;
pub use synth::{ImportOutcome, TypeSynthesizer};
