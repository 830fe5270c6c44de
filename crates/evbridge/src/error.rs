// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for the schema bridge.
//!
//! None of these errors are retried internally. Each carries the offending
//! name so the control plane can report it back to the caller.

use crate::dynamic::DynamicDataError;
use crate::schema::{QualifiedName, SchemaError};
use crate::signature::StructuralSignature;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Errors surfaced by import, export and the event codec.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed or incomplete input schema.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A second import under the same name disagrees with the bound shape.
    #[error("type conflict on {name}: bound signature {existing}, incoming {incoming}")]
    TypeConflict {
        name: QualifiedName,
        existing: StructuralSignature,
        incoming: StructuralSignature,
    },

    /// Export or serialization attempted on a type without a contract.
    #[error("type {type_name} is not annotated as an event contract")]
    ContractMissing { type_name: String },

    /// No resolvable contract, or the payload does not fit the contract.
    #[error("serialization failed for {type_name}: {reason}")]
    Serialization { type_name: String, reason: String },

    /// Wire type name is neither bound in the registry nor whitelisted.
    #[error("unknown event type: {name}")]
    UnknownType { name: String },

    /// Malformed dictionary payload.
    #[error("dictionary payload error: {0}")]
    Dictionary(String),

    /// Transport handed over a payload this subsystem does not decode.
    #[error("unrecognized content type: {0}")]
    UnsupportedContentType(String),

    #[error("dynamic data error: {0}")]
    Data(#[from] DynamicDataError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    pub(crate) fn serialization(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialization {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    /// True for the fail-closed refusal of an unresolvable wire type.
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }

    /// True when a re-import disagreed with an existing binding.
    pub fn is_type_conflict(&self) -> bool {
        matches!(self, Self::TypeConflict { .. })
    }
}
