// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema export of annotated native types.
//!
//! Walks a contract's `#[member]` fields in declaration order and produces
//! the equivalent [`SchemaModel`] plus its XSD documents. Only contracts are
//! exportable: the root, every nested member type and every base must carry
//! `#[contract]`, otherwise the export fails with `ContractMissing`.
//!
//! Each native type is emitted once, memoized by identity, so shared and
//! recursive substructure terminates. `Vec<T>` members become a named
//! `ArrayOf<T>` complex type with a single repeated element, which import
//! collapses back into a bare sequence.

use crate::config::ExportConfig;
use crate::contract::{NativeType, Reflect, TypeRef};
use crate::error::{BridgeError, Result};
use crate::schema::{
    render_documents, ComplexTypeDescriptor, ElementDecl, FieldDescriptor, QualifiedName,
    SchemaModel, TypeReference, XsdDocument,
};
use crate::signature::StructuralSignature;
use std::collections::HashMap;

/// Output of one export.
#[derive(Debug, Clone)]
pub struct ExportedSchema {
    /// Qualified name of the exported root contract.
    pub root: QualifiedName,
    /// Every complex type reachable from the root.
    pub model: SchemaModel,
    /// One XSD document per target namespace.
    pub documents: Vec<XsdDocument>,
}

impl ExportedSchema {
    /// Signature of the root type, as the importing side will compute it.
    pub fn signature(&self) -> Result<StructuralSignature> {
        Ok(StructuralSignature::of(&self.root, &self.model)?)
    }

    /// Document texts, ready for `SchemaSet::parse`.
    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.text.as_str()).collect()
    }
}

/// Native type → XML Schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaExporter {
    config: ExportConfig,
}

impl SchemaExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export contract `T`.
    pub fn export<T: Reflect>(&self) -> Result<ExportedSchema> {
        self.export_native(T::native_type())
    }

    /// Export a reflected type.
    pub fn export_native(&self, native: &'static NativeType) -> Result<ExportedSchema> {
        let mut session = ExportSession {
            config: &self.config,
            model: SchemaModel::new(),
            emitted: HashMap::new(),
        };
        let root = session.native(native)?;
        let documents = render_documents(&session.model, self.config.element_form);

        log::info!(
            "[export] {} -> {} complex type(s) in {} document(s)",
            root,
            session.model.complex_type_count(),
            documents.len()
        );
        Ok(ExportedSchema {
            root,
            model: session.model,
            documents,
        })
    }
}

struct ExportSession<'c> {
    config: &'c ExportConfig,
    model: SchemaModel,
    /// Identity of each emitted native type → its schema name.
    emitted: HashMap<*const NativeType, QualifiedName>,
}

impl ExportSession<'_> {
    fn native(&mut self, native: &'static NativeType) -> Result<QualifiedName> {
        let key = native as *const NativeType;
        if let Some(name) = self.emitted.get(&key) {
            return Ok(name.clone());
        }

        let name = native.qname().ok_or_else(|| BridgeError::ContractMissing {
            type_name: native.rust_name.to_string(),
        })?;
        // Registered before walking members so cycles stop here.
        self.emitted.insert(key, name.clone());

        let base = match native.base_type() {
            Some(base) => Some(self.native(base)?),
            None => None,
        };

        let mut fields = Vec::with_capacity(native.members.len());
        for member in &native.members {
            let type_ref = self.type_ref(&member.type_ref)?;
            let mut field = FieldDescriptor::new(member.name, type_ref);
            if member.optional {
                field = field.optional();
            }
            fields.push(field);
        }

        let mut descriptor = ComplexTypeDescriptor::new(name.clone(), fields);
        if let Some(base) = base {
            descriptor = descriptor.with_base(base);
        }
        self.emit(descriptor)?;
        log::debug!("[export] emitted {} for {}", name, native.rust_name);
        Ok(name)
    }

    fn type_ref(&mut self, type_ref: &TypeRef) -> Result<TypeReference> {
        match type_ref {
            TypeRef::Primitive(kind) => Ok(TypeReference::Primitive(*kind)),
            TypeRef::Native(native) => Ok(TypeReference::Complex(self.native(native())?)),
            TypeRef::Sequence(element) => Ok(TypeReference::Complex(self.array(element)?)),
        }
    }

    /// `ArrayOf<element>` wrapper for a sequence member.
    fn array(&mut self, element: &TypeRef) -> Result<QualifiedName> {
        let (namespace, item_name, item_ref) = match element {
            TypeRef::Primitive(kind) => (
                self.config.array_namespace.clone(),
                kind.xsd_name().to_string(),
                TypeReference::Primitive(*kind),
            ),
            TypeRef::Native(native) => Self::complex_item(self.native(native())?),
            TypeRef::Sequence(inner) => Self::complex_item(self.array(inner)?),
        };

        let name = QualifiedName::new(namespace, format!("ArrayOf{}", item_name));
        let item = FieldDescriptor::new(item_name, item_ref).repeated().optional();
        self.emit(ComplexTypeDescriptor::new(name.clone(), vec![item]))?;
        Ok(name)
    }

    /// Complex array items live in their own namespace, named after their type.
    fn complex_item(name: QualifiedName) -> (String, String, TypeReference) {
        (
            name.namespace().to_string(),
            name.local_name().to_string(),
            TypeReference::Complex(name),
        )
    }

    /// Add a complex type and its top-level element.
    fn emit(&mut self, descriptor: ComplexTypeDescriptor) -> Result<()> {
        let name = descriptor.name.clone();
        self.model.insert_complex(descriptor)?;
        self.model.insert_element(ElementDecl {
            name: name.clone(),
            type_ref: TypeReference::Complex(name),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::PrimitiveKind;
    use crate::schema::{SchemaError, SchemaSet};
    use serde::{Deserialize, Serialize};

    #[derive(Reflect, Serialize, Deserialize)]
    #[contract(name = "Leg", namespace = "urn:export")]
    struct Leg {
        #[member]
        qty: i32,
    }

    #[derive(Reflect, Serialize, Deserialize)]
    #[contract(name = "Order", namespace = "urn:export")]
    struct Order {
        #[member]
        id: String,
        #[member]
        legs: Vec<Leg>,
        #[member]
        marks: Vec<f64>,
        #[member]
        note: Option<String>,
        scratch: u64,
    }

    #[derive(Reflect, Serialize, Deserialize)]
    struct NotAContract {
        #[member]
        x: i32,
    }

    #[derive(Reflect, Serialize, Deserialize)]
    #[contract(name = "Holder", namespace = "urn:export")]
    struct Holder {
        #[member]
        inner: NotAContract,
    }

    #[derive(Reflect, Serialize, Deserialize)]
    #[contract(name = "Tree", namespace = "urn:export")]
    struct Tree {
        #[member]
        label: String,
        #[member]
        children: Vec<Tree>,
    }

    fn qn(local: &str) -> QualifiedName {
        QualifiedName::new("urn:export", local)
    }

    #[test]
    fn test_export_walks_annotated_members_in_order() {
        let exported = SchemaExporter::default().export::<Order>().expect("export");
        assert_eq!(exported.root, qn("Order"));

        let order = exported.model.require_complex(&qn("Order")).expect("Order");
        let names: Vec<_> = order.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "legs", "marks", "note"]);
        assert!(order.fields[3].optional);
        assert_eq!(order.fields[1].type_ref, TypeReference::Complex(qn("ArrayOfLeg")));

        let marks = QualifiedName::new(&*ExportConfig::default().array_namespace, "ArrayOfdouble");
        assert_eq!(order.fields[2].type_ref, TypeReference::Complex(marks.clone()));
        let array = exported.model.require_complex(&marks).expect("ArrayOfdouble");
        assert!(array.is_collection());
        assert_eq!(array.fields[0].type_ref, TypeReference::Primitive(PrimitiveKind::F64));

        // one element per complex type
        assert_eq!(
            exported.model.elements().count(),
            exported.model.complex_type_count()
        );
    }

    #[test]
    fn test_export_import_signature_round_trip() {
        let exported = SchemaExporter::default().export::<Order>().expect("export");
        let imported = SchemaSet::parse(&exported.texts())
            .expect("parse")
            .build()
            .expect("build");
        assert_eq!(
            StructuralSignature::of(&qn("Order"), &imported).expect("imported signature"),
            exported.signature().expect("exported signature")
        );
    }

    #[test]
    fn test_non_contract_root_is_refused() {
        let err = SchemaExporter::default()
            .export::<NotAContract>()
            .expect_err("not a contract");
        assert!(matches!(err, BridgeError::ContractMissing { type_name } if type_name.contains("NotAContract")));
    }

    #[test]
    fn test_non_contract_member_is_refused() {
        let err = SchemaExporter::default().export::<Holder>().expect_err("nested");
        assert!(matches!(err, BridgeError::ContractMissing { .. }));
    }

    #[test]
    fn test_recursive_contract_exports_once() {
        let exported = SchemaExporter::default().export::<Tree>().expect("export");
        let tree = exported.model.require_complex(&qn("Tree")).expect("Tree");
        assert_eq!(tree.fields[1].type_ref, TypeReference::Complex(qn("ArrayOfTree")));
        assert_eq!(exported.model.complex_type_count(), 2);
        assert!(exported.signature().is_ok());
    }

    #[test]
    fn test_documents_split_by_namespace() {
        let exported = SchemaExporter::default().export::<Order>().expect("export");
        assert_eq!(exported.documents.len(), 2);
        let reparsed = SchemaSet::parse(&exported.texts()).expect("parse");
        assert_eq!(reparsed.document_count(), 2);
        assert!(!matches!(reparsed.build(), Err(SchemaError::MissingType(_))));
    }
}
