// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use crate::schema::{QualifiedName, SERIALIZATION_NAMESPACE, XSD_NAMESPACE};
use std::sync::Arc;

/// Primitive type kinds.
///
/// Each kind has a schema name (the XSD built-in it maps to) and, for most
/// kinds, a host wire name used by the remote engine for bare primitive
/// events (`System.Int32`, `System.DateTime`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Char,
    String,
    DateTime,
    Guid,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 16] = [
        Self::Bool,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Decimal,
        Self::Char,
        Self::String,
        Self::DateTime,
        Self::Guid,
    ];

    /// Local name of the schema type this kind exports as.
    pub fn xsd_name(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::I8 => "byte",
            Self::U8 => "unsignedByte",
            Self::I16 => "short",
            Self::U16 => "unsignedShort",
            Self::I32 => "int",
            Self::U32 => "unsignedInt",
            Self::I64 => "long",
            Self::U64 => "unsignedLong",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::DateTime => "dateTime",
            Self::Guid => "guid",
        }
    }

    /// Namespace of the schema type this kind exports as.
    ///
    /// `guid` and `char` are not XSD built-ins and live in the
    /// serialization namespace.
    pub fn xsd_namespace(&self) -> &'static str {
        match self {
            Self::Guid | Self::Char => SERIALIZATION_NAMESPACE,
            _ => XSD_NAMESPACE,
        }
    }

    pub fn xsd_qname(&self) -> QualifiedName {
        QualifiedName::new(self.xsd_namespace(), self.xsd_name())
    }

    /// Map a built-in schema type to a primitive kind.
    pub fn from_xsd(namespace: &str, local: &str) -> Option<Self> {
        if namespace == SERIALIZATION_NAMESPACE {
            return match local {
                "guid" => Some(Self::Guid),
                "char" => Some(Self::Char),
                "duration" => Some(Self::String),
                _ => None,
            };
        }
        if namespace != XSD_NAMESPACE {
            return None;
        }
        let kind = match local {
            "boolean" => Self::Bool,
            "byte" => Self::I8,
            "unsignedByte" => Self::U8,
            "short" => Self::I16,
            "unsignedShort" => Self::U16,
            "int" => Self::I32,
            "unsignedInt" => Self::U32,
            "long" | "integer" => Self::I64,
            "unsignedLong" => Self::U64,
            "float" => Self::F32,
            "double" => Self::F64,
            "decimal" => Self::Decimal,
            "dateTime" | "date" => Self::DateTime,
            "string" | "normalizedString" | "token" | "anyURI" | "QName" | "duration"
            | "time" | "language" | "NCName" | "Name" | "ID" => Self::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Host type name carried in wire envelopes for bare primitive events.
    ///
    /// `Char` has no wire name and cannot travel as a top-level event.
    pub fn wire_name(&self) -> Option<&'static str> {
        let name = match self {
            Self::Bool => "System.Boolean",
            Self::I8 => "System.SByte",
            Self::U8 => "System.Byte",
            Self::I16 => "System.Int16",
            Self::U16 => "System.UInt16",
            Self::I32 => "System.Int32",
            Self::U32 => "System.UInt32",
            Self::I64 => "System.Int64",
            Self::U64 => "System.UInt64",
            Self::F32 => "System.Single",
            Self::F64 => "System.Double",
            Self::Decimal => "System.Decimal",
            Self::String => "System.String",
            Self::DateTime => "System.DateTime",
            Self::Guid => "System.Guid",
            Self::Char => return None,
        };
        Some(name)
    }

    /// Is this an integral kind.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::U8 | Self::I16 | Self::U16 | Self::I32 | Self::U32 | Self::I64 | Self::U64
        )
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Record with ordered named members (inherited members first).
    Struct(Vec<MemberDescriptor>),
    /// Sequence of one element type.
    Sequence(SequenceDescriptor),
    /// Ad-hoc string-keyed map with heterogeneous values.
    Map,
    /// Back-reference to a named type, resolved through the registry.
    ///
    /// Only produced for recursive schemas, where the referenced type is
    /// still being synthesized when the reference is taken.
    Reference(QualifiedName),
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name (Clark notation for schema types, host name for primitives).
    pub name: String,
    /// Qualified schema name, for types synthesized from a schema.
    pub qname: Option<QualifiedName>,
    /// Type kind.
    pub kind: TypeKind,
    /// Base type this one extends.
    pub base: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            qname: None,
            kind,
            base: None,
        }
    }

    /// Primitive descriptor named after its host wire name.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        let name = kind.wire_name().unwrap_or_else(|| kind.xsd_name());
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Create a struct type descriptor.
    pub fn struct_type(name: impl Into<String>, members: Vec<MemberDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(members))
    }

    /// Descriptor bound to a schema name; `name` is its Clark form.
    pub fn named(qname: QualifiedName, kind: TypeKind) -> Self {
        Self {
            name: qname.to_string(),
            qname: Some(qname),
            kind,
            base: None,
        }
    }

    pub fn with_base(mut self, base: Arc<TypeDescriptor>) -> Self {
        self.base = Some(base);
        self
    }

    /// Check if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    /// Check if this is a sequence type.
    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, TypeKind::Sequence(_))
    }

    /// Get members if this is a struct.
    pub fn members(&self) -> Option<&[MemberDescriptor]> {
        match &self.kind {
            TypeKind::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Get member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members()?.iter().find(|m| m.name == name)
    }

    /// Get member index by name.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members()?.iter().position(|m| m.name == name)
    }

    /// Member names in layout order.
    pub fn member_names(&self) -> Vec<&str> {
        self.members()
            .map(|members| members.iter().map(|m| m.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Element type if this is a sequence.
    pub fn element_type(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.kind {
            TypeKind::Sequence(seq) => Some(&seq.element_type),
            _ => None,
        }
    }

    /// Does this type extend `name`, directly or through its chain.
    pub fn extends(&self, name: &QualifiedName) -> bool {
        let mut current = self.base.as_deref();
        while let Some(base) = current {
            if base.qname.as_ref() == Some(name) {
                return true;
            }
            current = base.base.as_deref();
        }
        false
    }
}

/// Member descriptor for struct members.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    /// Member name.
    pub name: String,
    /// Member type.
    pub type_desc: Arc<TypeDescriptor>,
    /// May be absent on the wire (`minOccurs="0"` / nillable).
    pub optional: bool,
}

impl MemberDescriptor {
    /// Create a new member descriptor.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
            optional: false,
        }
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Sequence type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
}

impl SequenceDescriptor {
    pub fn new(element_type: Arc<TypeDescriptor>) -> Self {
        Self { element_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xsd_mapping_roundtrip() {
        for kind in PrimitiveKind::ALL {
            let qname = kind.xsd_qname();
            assert_eq!(
                PrimitiveKind::from_xsd(qname.namespace(), qname.local_name()),
                Some(kind),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn test_xsd_aliases() {
        assert_eq!(
            PrimitiveKind::from_xsd(XSD_NAMESPACE, "token"),
            Some(PrimitiveKind::String)
        );
        assert_eq!(
            PrimitiveKind::from_xsd(XSD_NAMESPACE, "date"),
            Some(PrimitiveKind::DateTime)
        );
        assert_eq!(PrimitiveKind::from_xsd("urn:other", "int"), None);
        assert_eq!(PrimitiveKind::from_xsd(XSD_NAMESPACE, "anyType"), None);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(PrimitiveKind::DateTime.wire_name(), Some("System.DateTime"));
        assert_eq!(PrimitiveKind::F32.wire_name(), Some("System.Single"));
        assert_eq!(PrimitiveKind::Char.wire_name(), None);
        assert_eq!(TypeDescriptor::primitive(PrimitiveKind::Guid).name, "System.Guid");
    }

    #[test]
    fn test_struct_members() {
        let int = Arc::new(TypeDescriptor::primitive(PrimitiveKind::I32));
        let text = Arc::new(TypeDescriptor::primitive(PrimitiveKind::String));

        let desc = TypeDescriptor::struct_type(
            "Point",
            vec![
                MemberDescriptor::new("x", int),
                MemberDescriptor::new("label", text).optional(),
            ],
        );
        assert!(desc.is_struct());
        assert_eq!(desc.member_names(), vec!["x", "label"]);
        assert_eq!(desc.member_index("label"), Some(1));
        assert!(desc.member("label").map(|m| m.optional).unwrap_or(false));
        assert!(desc.member("z").is_none());
    }

    #[test]
    fn test_extends_walks_chain() {
        let a = QualifiedName::new("urn:t", "A");
        let b = QualifiedName::new("urn:t", "B");
        let base_a = Arc::new(TypeDescriptor::named(a.clone(), TypeKind::Struct(vec![])));
        let base_b = Arc::new(
            TypeDescriptor::named(b.clone(), TypeKind::Struct(vec![])).with_base(base_a),
        );
        let c = TypeDescriptor::named(QualifiedName::new("urn:t", "C"), TypeKind::Struct(vec![]))
            .with_base(base_b);

        assert!(c.extends(&a));
        assert!(c.extends(&b));
        assert!(!c.extends(&QualifiedName::new("urn:t", "C")));
    }
}
