// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural signatures of complex types.
//!
//! A signature is the MD5 digest of a type's linearized shape:
//!
//! ```text
//! type:<qname>
//! base:<qname>#<base signature>            (only with a base)
//! field:<name>:<type token>:<1|*>         (per declared field, in order)
//! ```
//!
//! The type token of a primitive is its XSD name. A complex field type
//! contributes `<qname>#<nested signature>`, so equality is structural all the
//! way down. A field that points back into a type whose linearization is still
//! in progress contributes `<qname>` alone (the same holds for a base that is
//! already being linearized), which keeps recursive types finite.
//!
//! Occurrence bounds other than repetition (`minOccurs`, `nillable`) do not
//! take part: they do not change the wire layout.

use crate::schema::{ComplexTypeDescriptor, DescriptorSource, QualifiedName, SchemaError, TypeReference};
use md5::{Digest, Md5};
use std::fmt;

/// 16-byte structural digest of a complex type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuralSignature([u8; 16]);

impl StructuralSignature {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Signature of `descriptor`, resolving nested complex types through `source`.
    ///
    /// Fails with [`SchemaError::MissingType`] when a base or field type is not
    /// known to `source`.
    pub fn compute<S>(descriptor: &ComplexTypeDescriptor, source: &S) -> Result<Self, SchemaError>
    where
        S: DescriptorSource + ?Sized,
    {
        let mut in_progress = Vec::new();
        linearize(descriptor, source, &mut in_progress)
    }

    /// Signature of the complex type named `name` in `source`.
    pub fn of<S>(name: &QualifiedName, source: &S) -> Result<Self, SchemaError>
    where
        S: DescriptorSource + ?Sized,
    {
        let descriptor = source
            .complex_type(name)
            .ok_or_else(|| SchemaError::MissingType(name.clone()))?;
        Self::compute(descriptor, source)
    }
}

fn linearize<S>(
    descriptor: &ComplexTypeDescriptor,
    source: &S,
    in_progress: &mut Vec<QualifiedName>,
) -> Result<StructuralSignature, SchemaError>
where
    S: DescriptorSource + ?Sized,
{
    in_progress.push(descriptor.name.clone());

    let mut hasher = Md5::new();
    hasher.update(b"type:");
    hasher.update(descriptor.name.to_string().as_bytes());
    hasher.update(b"\n");

    if let Some(base) = &descriptor.base {
        let line = if in_progress.contains(base) {
            format!("base:{}\n", base)
        } else {
            let base_desc = source
                .complex_type(base)
                .ok_or_else(|| SchemaError::MissingType(base.clone()))?;
            format!("base:{}#{}\n", base, linearize(base_desc, source, in_progress)?)
        };
        hasher.update(line.as_bytes());
    }

    for field in &descriptor.fields {
        let token = match &field.type_ref {
            TypeReference::Primitive(kind) => kind.xsd_name().to_string(),
            TypeReference::Complex(name) if in_progress.contains(name) => name.to_string(),
            TypeReference::Complex(name) => {
                let nested = source
                    .complex_type(name)
                    .ok_or_else(|| SchemaError::MissingType(name.clone()))?;
                format!("{}#{}", name, linearize(nested, source, in_progress)?)
            }
        };
        let occurs = if field.repeated { '*' } else { '1' };
        hasher.update(format!("field:{}:{}:{}\n", field.name, token, occurs).as_bytes());
    }

    in_progress.pop();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hasher.finalize()[..]);
    Ok(StructuralSignature(bytes))
}

impl fmt::Debug for StructuralSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructuralSignature(")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for StructuralSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl From<[u8; 16]> for StructuralSignature {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for StructuralSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::PrimitiveKind;
    use crate::schema::{FieldDescriptor, SchemaModel};

    fn qn(local: &str) -> QualifiedName {
        QualifiedName::new("urn:sig", local)
    }

    fn model_of(types: Vec<ComplexTypeDescriptor>) -> SchemaModel {
        let mut model = SchemaModel::new();
        for desc in types {
            model.insert_complex(desc).expect("insert");
        }
        model
    }

    #[test]
    fn test_signature_is_deterministic() {
        let desc = ComplexTypeDescriptor::new(
            qn("Tick"),
            vec![
                FieldDescriptor::primitive("a", PrimitiveKind::I32),
                FieldDescriptor::primitive("b", PrimitiveKind::String),
            ],
        );
        let model = model_of(vec![desc.clone()]);
        let first = StructuralSignature::compute(&desc, &model).expect("sig");
        let second = StructuralSignature::compute(&desc, &model).expect("sig");
        assert_eq!(first, second);
    }

    #[test]
    fn test_field_order_changes_signature() {
        let ab = ComplexTypeDescriptor::new(
            qn("Tick"),
            vec![
                FieldDescriptor::primitive("a", PrimitiveKind::I32),
                FieldDescriptor::primitive("b", PrimitiveKind::String),
            ],
        );
        let ba = ComplexTypeDescriptor::new(
            qn("Tick"),
            vec![
                FieldDescriptor::primitive("b", PrimitiveKind::String),
                FieldDescriptor::primitive("a", PrimitiveKind::I32),
            ],
        );
        let model = SchemaModel::new();
        assert_ne!(
            StructuralSignature::compute(&ab, &model).expect("ab"),
            StructuralSignature::compute(&ba, &model).expect("ba")
        );
    }

    #[test]
    fn test_name_base_and_repetition_discriminate() {
        let model = model_of(vec![ComplexTypeDescriptor::new(qn("Base"), vec![])]);
        let plain = ComplexTypeDescriptor::new(
            qn("T"),
            vec![FieldDescriptor::primitive("x", PrimitiveKind::I32)],
        );
        let renamed = ComplexTypeDescriptor::new(qn("U"), plain.fields.clone());
        let based = plain.clone().with_base(qn("Base"));
        let repeated = ComplexTypeDescriptor::new(
            qn("T"),
            vec![FieldDescriptor::primitive("x", PrimitiveKind::I32).repeated()],
        );

        let sig = |d: &ComplexTypeDescriptor| StructuralSignature::compute(d, &model).expect("sig");
        let base_sig = sig(&plain);
        assert_ne!(base_sig, sig(&renamed));
        assert_ne!(base_sig, sig(&based));
        assert_ne!(base_sig, sig(&repeated));
    }

    #[test]
    fn test_optionality_does_not_change_signature() {
        let model = SchemaModel::new();
        let required = ComplexTypeDescriptor::new(
            qn("T"),
            vec![FieldDescriptor::primitive("x", PrimitiveKind::String)],
        );
        let optional = ComplexTypeDescriptor::new(
            qn("T"),
            vec![FieldDescriptor::primitive("x", PrimitiveKind::String).optional()],
        );
        assert_eq!(
            StructuralSignature::compute(&required, &model).expect("required"),
            StructuralSignature::compute(&optional, &model).expect("optional")
        );
    }

    #[test]
    fn test_nested_shape_change_propagates() {
        let outer = ComplexTypeDescriptor::new(
            qn("Outer"),
            vec![FieldDescriptor::complex("inner", qn("Inner"))],
        );
        let v1 = model_of(vec![
            outer.clone(),
            ComplexTypeDescriptor::new(
                qn("Inner"),
                vec![FieldDescriptor::primitive("x", PrimitiveKind::I32)],
            ),
        ]);
        let v2 = model_of(vec![
            outer.clone(),
            ComplexTypeDescriptor::new(
                qn("Inner"),
                vec![FieldDescriptor::primitive("x", PrimitiveKind::I64)],
            ),
        ]);
        assert_ne!(
            StructuralSignature::compute(&outer, &v1).expect("v1"),
            StructuralSignature::compute(&outer, &v2).expect("v2")
        );
    }

    #[test]
    fn test_recursive_type_terminates() {
        let node = ComplexTypeDescriptor::new(
            qn("Node"),
            vec![
                FieldDescriptor::primitive("value", PrimitiveKind::I32),
                FieldDescriptor::complex("next", qn("Node")).optional(),
            ],
        );
        let model = model_of(vec![node]);
        let sig = StructuralSignature::of(&qn("Node"), &model).expect("recursive sig");
        assert_eq!(sig, StructuralSignature::of(&qn("Node"), &model).expect("again"));
    }

    #[test]
    fn test_missing_nested_type() {
        let outer = ComplexTypeDescriptor::new(
            qn("Outer"),
            vec![FieldDescriptor::complex("ghost", qn("Ghost"))],
        );
        let err = StructuralSignature::compute(&outer, &SchemaModel::new()).expect_err("missing");
        assert!(matches!(err, SchemaError::MissingType(name) if name == qn("Ghost")));
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        let sig = StructuralSignature::from_bytes([0xab; 16]);
        assert_eq!(sig.to_string(), "ab".repeat(16));
        assert!(format!("{:?}", sig).starts_with("StructuralSignature("));
    }
}
