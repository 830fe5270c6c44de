// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory representation of an imported schema type graph.

use super::{QualifiedName, SchemaError};
use crate::dynamic::PrimitiveKind;
use indexmap::IndexMap;

/// Resolved type of a field or element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeReference {
    /// Simple-type leaf.
    Primitive(PrimitiveKind),
    /// Named complex type in the same model.
    Complex(QualifiedName),
}

impl TypeReference {
    /// Name used in signatures and listings.
    pub fn type_name(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.xsd_name().to_string(),
            Self::Complex(name) => name.to_string(),
        }
    }

    pub fn as_complex(&self) -> Option<&QualifiedName> {
        match self {
            Self::Complex(name) => Some(name),
            Self::Primitive(_) => None,
        }
    }
}

/// One declared field of a complex type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_ref: TypeReference,
    /// Schema allows more than one occurrence (`maxOccurs` > 1).
    pub repeated: bool,
    /// Schema allows zero occurrences or nil.
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            name: name.into(),
            type_ref,
            repeated: false,
            optional: false,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeReference::Primitive(kind))
    }

    pub fn complex(name: impl Into<String>, type_name: QualifiedName) -> Self {
        Self::new(name, TypeReference::Complex(type_name))
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A named complex type: ordered declared fields plus an optional single base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexTypeDescriptor {
    pub name: QualifiedName,
    /// Declared fields only; inherited fields live on the base.
    pub fields: Vec<FieldDescriptor>,
    pub base: Option<QualifiedName>,
}

impl ComplexTypeDescriptor {
    pub fn new(name: QualifiedName, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name,
            fields,
            base: None,
        }
    }

    pub fn with_base(mut self, base: QualifiedName) -> Self {
        self.base = Some(base);
        self
    }

    /// Exactly one repeated field and no base: the type is a bare list.
    pub fn is_collection(&self) -> bool {
        self.base.is_none() && self.fields.len() == 1 && self.fields[0].repeated
    }
}

/// Top-level element declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    pub name: QualifiedName,
    pub type_ref: TypeReference,
}

/// Lookup of complex types by name, used by signature computation.
pub trait DescriptorSource {
    fn complex_type(&self, name: &QualifiedName) -> Option<&ComplexTypeDescriptor>;
}

/// All complex types and top-level elements of one schema set.
///
/// Declaration order is preserved so that import and export walk the graph
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaModel {
    complex_types: IndexMap<QualifiedName, ComplexTypeDescriptor>,
    elements: IndexMap<QualifiedName, ElementDecl>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a complex type. Re-adding an identical declaration is a no-op.
    pub fn insert_complex(&mut self, descriptor: ComplexTypeDescriptor) -> Result<(), SchemaError> {
        match self.complex_types.get(&descriptor.name) {
            Some(existing) if *existing == descriptor => Ok(()),
            Some(_) => Err(SchemaError::DuplicateType(descriptor.name)),
            None => {
                self.complex_types
                    .insert(descriptor.name.clone(), descriptor);
                Ok(())
            }
        }
    }

    /// Add a top-level element. Re-adding an identical declaration is a no-op.
    pub fn insert_element(&mut self, element: ElementDecl) -> Result<(), SchemaError> {
        match self.elements.get(&element.name) {
            Some(existing) if *existing == element => Ok(()),
            Some(_) => Err(SchemaError::DuplicateElement(element.name)),
            None => {
                self.elements.insert(element.name.clone(), element);
                Ok(())
            }
        }
    }

    pub fn element(&self, name: &QualifiedName) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    /// Element lookup that fails with the missing name.
    pub fn require_element(&self, name: &QualifiedName) -> Result<&ElementDecl, SchemaError> {
        self.element(name)
            .ok_or_else(|| SchemaError::MissingElement(name.clone()))
    }

    /// Type lookup that fails with the missing name.
    pub fn require_complex(&self, name: &QualifiedName) -> Result<&ComplexTypeDescriptor, SchemaError> {
        self.complex_types
            .get(name)
            .ok_or_else(|| SchemaError::MissingType(name.clone()))
    }

    pub fn complex_types(&self) -> impl Iterator<Item = &ComplexTypeDescriptor> {
        self.complex_types.values()
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementDecl> {
        self.elements.values()
    }

    pub fn complex_type_count(&self) -> usize {
        self.complex_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complex_types.is_empty() && self.elements.is_empty()
    }

    /// Namespaces that own at least one type or element, in first-seen order.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let names = self
            .complex_types
            .keys()
            .chain(self.elements.keys());
        for name in names {
            if !seen.contains(&name.namespace()) {
                seen.push(name.namespace());
            }
        }
        seen
    }

    /// Check every complex reference and base resolves, and that no
    /// extension chain loops.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let check = |type_ref: &TypeReference| match type_ref {
            TypeReference::Complex(name) => self.require_complex(name).map(|_| ()),
            TypeReference::Primitive(_) => Ok(()),
        };

        for element in self.elements.values() {
            check(&element.type_ref)?;
        }
        for descriptor in self.complex_types.values() {
            for field in &descriptor.fields {
                check(&field.type_ref)?;
            }
            self.base_chain(&descriptor.name)?;
        }
        Ok(())
    }

    /// Base chain of `name`, nearest base first.
    pub fn base_chain(&self, name: &QualifiedName) -> Result<Vec<&ComplexTypeDescriptor>, SchemaError> {
        let mut chain = Vec::new();
        let mut current = self.require_complex(name)?;
        while let Some(base_name) = &current.base {
            if base_name == name || chain.iter().any(|d: &&ComplexTypeDescriptor| &d.name == base_name) {
                return Err(SchemaError::CyclicExtension(name.clone()));
            }
            let base = self.require_complex(base_name)?;
            chain.push(base);
            current = base;
        }
        Ok(chain)
    }
}

impl DescriptorSource for SchemaModel {
    fn complex_type(&self, name: &QualifiedName) -> Option<&ComplexTypeDescriptor> {
        self.complex_types.get(name)
    }
}
