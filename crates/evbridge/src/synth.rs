// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native type synthesis from schema descriptors.
//!
//! A synthesis run holds the registry's synthesis lock for its whole
//! duration and stages every new binding locally. Nothing becomes visible
//! through [`TypeRegistry::resolve`] until the requested type and everything
//! it pulls in (fields, base chain) have been synthesized; a failure anywhere
//! discards the staged bindings.
//!
//! Layout rules:
//! - a type with exactly one repeated field and no base becomes a bare
//!   sequence of that field's element type;
//! - an extending type lists its base's members first, then its own;
//! - a reference back into a type still being synthesized becomes
//!   [`TypeKind::Reference`], resolved through the registry on use;
//! - a type whose base is still being synthesized is referenced the same way
//!   and laid out once that base is complete.

use crate::dynamic::{
    MemberDescriptor, NativeTypeHandle, SequenceDescriptor, TypeDescriptor,
    TypeDescriptorBuilder, TypeKind,
};
use crate::error::{BridgeError, Result};
use crate::registry::{NativeTypeBinding, TypeRegistry};
use crate::schema::{
    ComplexTypeDescriptor, FieldDescriptor, QualifiedName, SchemaError, SchemaModel,
    TypeReference,
};
use crate::signature::StructuralSignature;
use indexmap::IndexMap;
use std::sync::Arc;

/// Result of importing a schema model.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// One entry per top-level element, in declaration order.
    pub elements: Vec<ImportedElement>,
    /// Names bound by this import; empty when everything was already bound.
    pub created: Vec<QualifiedName>,
}

impl ImportOutcome {
    /// Handle synthesized for the element named `name`.
    pub fn handle(&self, name: &QualifiedName) -> Option<&NativeTypeHandle> {
        self.elements
            .iter()
            .find(|e| &e.element == name)
            .map(|e| &e.handle)
    }
}

#[derive(Debug, Clone)]
pub struct ImportedElement {
    pub element: QualifiedName,
    /// Complex type behind the element; `None` for simple-typed elements.
    pub type_name: Option<QualifiedName>,
    pub handle: NativeTypeHandle,
}

/// Turns [`SchemaModel`] complex types into registry bindings.
pub struct TypeSynthesizer<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> TypeSynthesizer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Synthesize (or reuse) the native type for one complex type.
    pub fn synthesize(&self, model: &SchemaModel, name: &QualifiedName) -> Result<NativeTypeHandle> {
        let guard = self.registry.lock_synthesis();
        let mut session = Session::new(model, self.registry);
        let handle = session.complex(name)?;
        let created = session.commit(&guard)?;
        if !created.is_empty() {
            log::info!("[synth] {} -> {} new binding(s)", name, created.len());
        }
        Ok(self.registry.resolve(name).unwrap_or(handle))
    }

    /// Import every top-level element of `model`.
    ///
    /// Importing the same model twice yields the same handles and creates no
    /// new bindings.
    pub fn import(&self, model: &SchemaModel) -> Result<ImportOutcome> {
        let guard = self.registry.lock_synthesis();
        let mut session = Session::new(model, self.registry);

        let mut staged = Vec::new();
        for element in model.elements() {
            let (type_name, handle) = match &element.type_ref {
                TypeReference::Complex(name) => (Some(name.clone()), session.complex(name)?),
                TypeReference::Primitive(kind) => (None, Arc::new(TypeDescriptor::primitive(*kind))),
            };
            staged.push((element.name.clone(), type_name, handle));
        }

        let created = session.commit(&guard)?;
        drop(guard);

        // Hand out the published handles, not the staged copies.
        let elements = staged
            .into_iter()
            .map(|(element, type_name, handle)| {
                let handle = type_name
                    .as_ref()
                    .and_then(|name| self.registry.resolve(name))
                    .unwrap_or(handle);
                ImportedElement {
                    element,
                    type_name,
                    handle,
                }
            })
            .collect();

        log::info!(
            "[synth] imported {} element(s), {} new binding(s)",
            model.elements().count(),
            created.len()
        );
        Ok(ImportOutcome { elements, created })
    }
}

fn reference(name: &QualifiedName) -> NativeTypeHandle {
    Arc::new(TypeDescriptor::named(
        name.clone(),
        TypeKind::Reference(name.clone()),
    ))
}

/// One synthesis run under the registry lock.
struct Session<'a> {
    model: &'a SchemaModel,
    registry: &'a TypeRegistry,
    staged: IndexMap<QualifiedName, NativeTypeBinding>,
    in_progress: Vec<QualifiedName>,
    /// Referenced types that could not be laid out yet.
    deferred: Vec<QualifiedName>,
}

impl<'a> Session<'a> {
    fn new(model: &'a SchemaModel, registry: &'a TypeRegistry) -> Self {
        Self {
            model,
            registry,
            staged: IndexMap::new(),
            in_progress: Vec::new(),
            deferred: Vec::new(),
        }
    }

    fn complex(&mut self, name: &QualifiedName) -> Result<NativeTypeHandle> {
        if let Some(staged) = self.staged.get(name) {
            return Ok(Arc::clone(&staged.handle));
        }
        if self.in_progress.contains(name) {
            return Ok(reference(name));
        }

        let descriptor = self.model.require_complex(name)?;
        let signature = StructuralSignature::compute(descriptor, self.model)?;

        if let Some(existing) = self.registry.binding(name) {
            if existing.signature == signature {
                log::debug!("[synth] reusing {} ({})", name, signature);
                return Ok(Arc::clone(&existing.handle));
            }
            log::warn!(
                "[synth] {} already bound with {}, incoming {}",
                name,
                existing.signature,
                signature
            );
            return Err(BridgeError::TypeConflict {
                name: name.clone(),
                existing: existing.signature,
                incoming: signature,
            });
        }

        if self.base_in_progress(name)? {
            log::debug!("[synth] deferring {} until its base is complete", name);
            self.deferred.push(name.clone());
            return Ok(reference(name));
        }

        self.in_progress.push(name.clone());
        let built = self.build(descriptor);
        self.in_progress.pop();
        let handle = Arc::new(built?);

        log::debug!("[synth] staged {} ({})", name, signature);
        self.staged.insert(
            name.clone(),
            NativeTypeBinding::new(name.clone(), Arc::clone(&handle), signature),
        );
        Ok(handle)
    }

    fn build(&mut self, descriptor: &ComplexTypeDescriptor) -> Result<TypeDescriptor> {
        let name = &descriptor.name;

        if descriptor.is_collection() {
            let element = self.element_type(&descriptor.fields[0])?;
            return Ok(TypeDescriptor::named(
                name.clone(),
                TypeKind::Sequence(SequenceDescriptor::new(element)),
            ));
        }

        let base = match &descriptor.base {
            Some(base_name) => {
                let base = self.complex(base_name)?;
                if matches!(base.kind, TypeKind::Reference(_)) {
                    return Err(SchemaError::CyclicExtension(name.clone()).into());
                }
                if !base.is_struct() {
                    return Err(SchemaError::ExtendsCollection {
                        name: name.clone(),
                        base: base_name.clone(),
                    }
                    .into());
                }
                Some(base)
            }
            None => None,
        };

        let mut members: Vec<MemberDescriptor> = base
            .as_ref()
            .and_then(|b| b.members())
            .map(<[MemberDescriptor]>::to_vec)
            .unwrap_or_default();

        for field in &descriptor.fields {
            let mut type_desc = self.element_type(field)?;
            if field.repeated {
                type_desc = Arc::new(TypeDescriptorBuilder::sequence_of(
                    format!("{}[]", type_desc.name),
                    type_desc,
                ));
            }
            let mut member = MemberDescriptor::new(field.name.clone(), type_desc);
            if field.optional {
                member = member.optional();
            }
            members.push(member);
        }

        let mut synthesized = TypeDescriptor::named(name.clone(), TypeKind::Struct(members));
        if let Some(base) = base {
            synthesized = synthesized.with_base(base);
        }
        Ok(synthesized)
    }

    fn base_in_progress(&self, name: &QualifiedName) -> Result<bool> {
        Ok(self
            .model
            .base_chain(name)?
            .iter()
            .any(|base| self.in_progress.contains(&base.name)))
    }

    /// Type of one occurrence of `field`.
    fn element_type(&mut self, field: &FieldDescriptor) -> Result<NativeTypeHandle> {
        match &field.type_ref {
            TypeReference::Primitive(kind) => Ok(Arc::new(TypeDescriptor::primitive(*kind))),
            TypeReference::Complex(name) => self.complex(name),
        }
    }

    /// Publish everything staged; returns the newly bound names.
    fn commit(mut self, guard: &crate::registry::SynthesisGuard<'_>) -> Result<Vec<QualifiedName>> {
        while let Some(name) = self.deferred.pop() {
            self.complex(&name)?;
        }
        let names: Vec<_> = self.staged.keys().cloned().collect();
        self.registry
            .publish(guard, self.staged.into_values().collect())?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::PrimitiveKind;
    use crate::schema::ElementDecl;

    fn qn(local: &str) -> QualifiedName {
        QualifiedName::new("urn:synth", local)
    }

    fn model(types: Vec<ComplexTypeDescriptor>) -> SchemaModel {
        let mut model = SchemaModel::new();
        for desc in types {
            let name = desc.name.clone();
            model.insert_complex(desc).expect("type");
            model
                .insert_element(ElementDecl {
                    name: name.clone(),
                    type_ref: TypeReference::Complex(name),
                })
                .expect("element");
        }
        model
    }

    #[test]
    fn test_single_repeated_field_collapses() {
        let registry = TypeRegistry::new();
        let m = model(vec![ComplexTypeDescriptor::new(
            qn("ArrayOfint"),
            vec![FieldDescriptor::primitive("int", PrimitiveKind::I32).repeated()],
        )]);
        let handle = TypeSynthesizer::new(&registry)
            .synthesize(&m, &qn("ArrayOfint"))
            .expect("synthesize");

        assert!(handle.is_sequence());
        assert!(handle.members().is_none());
        assert_eq!(
            handle.element_type().expect("element").kind,
            TypeKind::Primitive(PrimitiveKind::I32)
        );
    }

    #[test]
    fn test_extension_puts_base_members_first() {
        let registry = TypeRegistry::new();
        let m = model(vec![
            ComplexTypeDescriptor::new(
                qn("A"),
                vec![
                    FieldDescriptor::primitive("id", PrimitiveKind::I64),
                    FieldDescriptor::primitive("name", PrimitiveKind::String),
                ],
            ),
            ComplexTypeDescriptor::new(qn("B"), vec![FieldDescriptor::primitive("x", PrimitiveKind::F64)])
                .with_base(qn("A")),
        ]);
        let b = TypeSynthesizer::new(&registry).synthesize(&m, &qn("B")).expect("B");

        assert_eq!(b.member_names(), vec!["id", "name", "x"]);
        assert!(b.extends(&qn("A")));
        // base bound as a side effect, and shared
        let a = registry.resolve(&qn("A")).expect("A bound");
        assert!(Arc::ptr_eq(b.base.as_ref().expect("base"), &a));
    }

    #[test]
    fn test_extending_collection_is_rejected() {
        let registry = TypeRegistry::new();
        let m = model(vec![
            ComplexTypeDescriptor::new(
                qn("List"),
                vec![FieldDescriptor::primitive("item", PrimitiveKind::I32).repeated()],
            ),
            ComplexTypeDescriptor::new(qn("More"), vec![]).with_base(qn("List")),
        ]);
        let err = TypeSynthesizer::new(&registry)
            .synthesize(&m, &qn("More"))
            .expect_err("collection base");
        assert!(matches!(
            err,
            BridgeError::Schema(SchemaError::ExtendsCollection { .. })
        ));
        assert!(registry.is_empty(), "nothing published on failure");
    }

    #[test]
    fn test_repeated_field_in_record_is_sequence_member() {
        let registry = TypeRegistry::new();
        let m = model(vec![ComplexTypeDescriptor::new(
            qn("Basket"),
            vec![
                FieldDescriptor::primitive("owner", PrimitiveKind::String),
                FieldDescriptor::primitive("item", PrimitiveKind::String).repeated(),
            ],
        )]);
        let basket = TypeSynthesizer::new(&registry)
            .synthesize(&m, &qn("Basket"))
            .expect("Basket");
        assert!(basket.is_struct());
        assert!(basket.member("item").expect("item").type_desc.is_sequence());
    }

    #[test]
    fn test_recursive_type_uses_reference() {
        let registry = TypeRegistry::new();
        let m = model(vec![ComplexTypeDescriptor::new(
            qn("Node"),
            vec![
                FieldDescriptor::primitive("value", PrimitiveKind::I32),
                FieldDescriptor::complex("next", qn("Node")).optional(),
            ],
        )]);
        let node = TypeSynthesizer::new(&registry).synthesize(&m, &qn("Node")).expect("Node");
        let next = node.member("next").expect("next");
        assert!(next.optional);
        assert_eq!(next.type_desc.kind, TypeKind::Reference(qn("Node")));
    }

    #[test]
    fn test_member_extending_its_owner_is_deferred() {
        let registry = TypeRegistry::new();
        let m = model(vec![
            ComplexTypeDescriptor::new(
                qn("Shape"),
                vec![
                    FieldDescriptor::primitive("id", PrimitiveKind::I32),
                    FieldDescriptor::complex("child", qn("Circle")).optional(),
                ],
            ),
            ComplexTypeDescriptor::new(qn("Circle"), vec![FieldDescriptor::primitive("r", PrimitiveKind::F64)])
                .with_base(qn("Shape")),
        ]);
        let shape = TypeSynthesizer::new(&registry)
            .synthesize(&m, &qn("Shape"))
            .expect("Shape");
        assert_eq!(
            shape.member("child").expect("child").type_desc.kind,
            TypeKind::Reference(qn("Circle"))
        );

        let circle = registry.resolve(&qn("Circle")).expect("Circle published too");
        assert_eq!(circle.member_names(), vec!["id", "child", "r"]);
        assert!(circle.extends(&qn("Shape")));
    }

    #[test]
    fn test_import_twice_is_idempotent() {
        let registry = TypeRegistry::new();
        let m = model(vec![ComplexTypeDescriptor::new(
            qn("Tick"),
            vec![FieldDescriptor::primitive("px", PrimitiveKind::F64)],
        )]);
        let synth = TypeSynthesizer::new(&registry);

        let first = synth.import(&m).expect("first");
        let second = synth.import(&m).expect("second");
        assert_eq!(first.created, vec![qn("Tick")]);
        assert!(second.created.is_empty());
        assert!(Arc::ptr_eq(
            first.handle(&qn("Tick")).expect("first handle"),
            second.handle(&qn("Tick")).expect("second handle")
        ));
    }

    #[test]
    fn test_conflict_leaves_original_binding() {
        let registry = TypeRegistry::new();
        let synth = TypeSynthesizer::new(&registry);
        let v1 = model(vec![ComplexTypeDescriptor::new(
            qn("Tick"),
            vec![FieldDescriptor::primitive("px", PrimitiveKind::F64)],
        )]);
        let v2 = model(vec![ComplexTypeDescriptor::new(
            qn("Tick"),
            vec![
                FieldDescriptor::primitive("px", PrimitiveKind::F64),
                FieldDescriptor::primitive("qty", PrimitiveKind::I32),
            ],
        )]);

        let original = synth.synthesize(&v1, &qn("Tick")).expect("v1");
        let err = synth.import(&v2).expect_err("v2 conflicts");
        assert!(err.is_type_conflict());

        let still = registry.resolve(&qn("Tick")).expect("still bound");
        assert!(Arc::ptr_eq(&original, &still));
        assert_eq!(still.member_names(), vec!["px"]);
    }

    #[test]
    fn test_missing_type_fails_import() {
        let registry = TypeRegistry::new();
        let mut m = SchemaModel::new();
        m.insert_element(ElementDecl {
            name: qn("Orphan"),
            type_ref: TypeReference::Complex(qn("Orphan")),
        })
        .expect("element");
        let err = TypeSynthesizer::new(&registry).import(&m).expect_err("missing");
        assert!(matches!(err, BridgeError::Schema(SchemaError::MissingType(_))));
    }
}
