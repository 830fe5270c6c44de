// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::QualifiedName;
use thiserror::Error;

/// Malformed or incomplete input schema. Caller configuration error.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("document root is <{0}>, expected <xs:schema>")]
    NotASchema(String),

    #[error("element {0} is referenced but not declared in the schema set")]
    MissingElement(QualifiedName),

    #[error("type {0} is referenced but not declared in the schema set")]
    MissingType(QualifiedName),

    #[error("namespace prefix '{0}' is not declared")]
    UnknownPrefix(String),

    #[error("type {0} is declared twice with different shapes")]
    DuplicateType(QualifiedName),

    #[error("element {0} is declared twice with different types")]
    DuplicateElement(QualifiedName),

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("unsupported schema construct <{construct}> in {context}")]
    Unsupported { context: String, construct: String },

    #[error("invalid occurrence bound '{0}'")]
    InvalidOccurs(String),

    #[error("extension chain of {0} loops back on itself")]
    CyclicExtension(QualifiedName),

    #[error("type {name} extends {base}, which is a collection type")]
    ExtendsCollection {
        name: QualifiedName,
        base: QualifiedName,
    },
}

impl SchemaError {
    pub(crate) fn unsupported(context: impl Into<String>, construct: impl Into<String>) -> Self {
        Self::Unsupported {
            context: context.into(),
            construct: construct.into(),
        }
    }
}
