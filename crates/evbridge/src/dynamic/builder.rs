// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.
//!
//! The synthesizer builds descriptors from schemas; this builder is for
//! code that wants a descriptor without going through XSD (tests, local
//! ad-hoc event shapes).

use crate::dynamic::{MemberDescriptor, PrimitiveKind, SequenceDescriptor, TypeDescriptor, TypeKind};
use crate::schema::QualifiedName;
use std::sync::Arc;

/// Builder for creating struct TypeDescriptor instances.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    qname: Option<QualifiedName>,
    base: Option<Arc<TypeDescriptor>>,
    members: Vec<MemberDescriptor>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qname: None,
            base: None,
            members: Vec::new(),
        }
    }

    /// Builder for a schema-named struct type.
    pub fn named(qname: QualifiedName) -> Self {
        Self {
            name: qname.to_string(),
            qname: Some(qname),
            base: None,
            members: Vec::new(),
        }
    }

    /// Extend `base`: its members are copied in first, in order.
    pub fn extends(mut self, base: Arc<TypeDescriptor>) -> Self {
        if let Some(inherited) = base.members() {
            let mut members = inherited.to_vec();
            members.append(&mut self.members);
            self.members = members;
        }
        self.base = Some(base);
        self
    }

    /// Add a primitive member.
    pub fn field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field_with_type(name, Arc::new(TypeDescriptor::primitive(kind)))
    }

    /// Add a member with a type descriptor.
    pub fn field_with_type(mut self, name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        self.members.push(MemberDescriptor::new(name, type_desc));
        self
    }

    /// Add an optional primitive member.
    pub fn optional_field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        let type_desc = Arc::new(TypeDescriptor::primitive(kind));
        self.members
            .push(MemberDescriptor::new(name, type_desc).optional());
        self
    }

    /// Add a string member.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Add a sequence member.
    pub fn sequence_field(self, name: impl Into<String>, element_type: Arc<TypeDescriptor>) -> Self {
        let seq = Arc::new(Self::sequence_of("", element_type));
        self.field_with_type(name, seq)
    }

    /// Add a nested struct member.
    pub fn nested_field(self, name: impl Into<String>, nested: Arc<TypeDescriptor>) -> Self {
        self.field_with_type(name, nested)
    }

    /// Bare sequence type.
    pub fn sequence_of(name: impl Into<String>, element_type: Arc<TypeDescriptor>) -> TypeDescriptor {
        TypeDescriptor::new(name, TypeKind::Sequence(SequenceDescriptor::new(element_type)))
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            qname: self.qname,
            kind: TypeKind::Struct(self.members),
            base: self.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let desc = TypeDescriptorBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .field("y", PrimitiveKind::I32)
            .build();

        assert_eq!(desc.name, "Point");
        assert_eq!(desc.member_names(), vec!["x", "y"]);
        assert!(desc.qname.is_none());
    }

    #[test]
    fn test_builder_extension_puts_base_first() {
        let base = Arc::new(
            TypeDescriptorBuilder::named(QualifiedName::new("urn:t", "Base"))
                .field("id", PrimitiveKind::Guid)
                .build(),
        );
        let derived = TypeDescriptorBuilder::named(QualifiedName::new("urn:t", "Derived"))
            .field("price", PrimitiveKind::Decimal)
            .extends(base)
            .build();

        assert_eq!(derived.member_names(), vec!["id", "price"]);
        assert!(derived.extends(&QualifiedName::new("urn:t", "Base")));
    }

    #[test]
    fn test_sequence_field() {
        let desc = TypeDescriptorBuilder::new("Batch")
            .sequence_field("ids", Arc::new(TypeDescriptor::primitive(PrimitiveKind::I64)))
            .build();
        let member = desc.member("ids").expect("ids");
        assert!(member.type_desc.is_sequence());
    }
}
