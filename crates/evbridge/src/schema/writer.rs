// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XSD rendering of a [`SchemaModel`], one document per target namespace.

use super::{
    ComplexTypeDescriptor, FieldDescriptor, QualifiedName, SchemaModel, TypeReference,
    SERIALIZATION_NAMESPACE, XSD_NAMESPACE,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// `elementFormDefault` of rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementForm {
    #[default]
    Qualified,
    Unqualified,
}

impl ElementForm {
    fn as_str(self) -> &'static str {
        match self {
            Self::Qualified => "qualified",
            Self::Unqualified => "unqualified",
        }
    }
}

/// One rendered schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdDocument {
    pub target_namespace: String,
    pub text: String,
}

/// Render every namespace of `model` as its own document.
///
/// Documents reference each other through `xs:import`; the set can be fed
/// back to [`SchemaSet::parse`](super::SchemaSet::parse) as-is.
pub fn render_documents(model: &SchemaModel, form: ElementForm) -> Vec<XsdDocument> {
    model
        .namespaces()
        .into_iter()
        .map(|ns| XsdDocument {
            target_namespace: ns.to_string(),
            text: render_namespace(model, ns, form),
        })
        .collect()
}

struct Prefixes {
    target: String,
    others: Vec<(String, String)>,
}

impl Prefixes {
    fn collect(model: &SchemaModel, target: &str) -> Self {
        let mut others: Vec<(String, String)> = Vec::new();
        let mut note = |ns: &str| {
            if ns != target && !ns.is_empty() && !others.iter().any(|(n, _)| n == ns) {
                let prefix = format!("q{}", others.len() + 1);
                others.push((ns.to_string(), prefix));
            }
        };

        for desc in model.complex_types().filter(|d| d.name.namespace() == target) {
            if let Some(base) = &desc.base {
                note(base.namespace());
            }
            for field in &desc.fields {
                if let TypeReference::Complex(name) = &field.type_ref {
                    note(name.namespace());
                }
            }
        }
        for element in model.elements().filter(|e| e.name.namespace() == target) {
            if let TypeReference::Complex(name) = &element.type_ref {
                note(name.namespace());
            }
        }

        Self {
            target: target.to_string(),
            others,
        }
    }

    fn qualify(&self, name: &QualifiedName) -> String {
        let ns = name.namespace();
        if ns.is_empty() {
            name.local_name().to_string()
        } else if ns == self.target {
            format!("tns:{}", name.local_name())
        } else {
            let prefix = self
                .others
                .iter()
                .find(|(n, _)| n == ns)
                .map_or("tns", |(_, p)| p.as_str());
            format!("{}:{}", prefix, name.local_name())
        }
    }

    fn type_ref(&self, type_ref: &TypeReference) -> String {
        match type_ref {
            TypeReference::Primitive(kind) if kind.xsd_namespace() == SERIALIZATION_NAMESPACE => {
                format!("ser:{}", kind.xsd_name())
            }
            TypeReference::Primitive(kind) => format!("xs:{}", kind.xsd_name()),
            TypeReference::Complex(name) => self.qualify(name),
        }
    }
}

fn render_namespace(model: &SchemaModel, target: &str, form: ElementForm) -> String {
    let prefixes = Prefixes::collect(model, target);
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let _ = write!(
        out,
        "<xs:schema xmlns:xs=\"{}\" xmlns:ser=\"{}\"",
        XSD_NAMESPACE, SERIALIZATION_NAMESPACE
    );
    if !target.is_empty() {
        let _ = write!(out, " xmlns:tns=\"{}\"", escape(target));
    }
    for (ns, prefix) in &prefixes.others {
        let _ = write!(out, " xmlns:{}=\"{}\"", prefix, escape(ns));
    }
    let _ = write!(out, " elementFormDefault=\"{}\"", form.as_str());
    if !target.is_empty() {
        let _ = write!(out, " targetNamespace=\"{}\"", escape(target));
    }
    out.push_str(">\n");

    for (ns, _) in &prefixes.others {
        let _ = writeln!(out, "  <xs:import namespace=\"{}\"/>", escape(ns));
    }

    for desc in model.complex_types().filter(|d| d.name.namespace() == target) {
        render_complex(&mut out, desc, &prefixes);
    }
    for element in model.elements().filter(|e| e.name.namespace() == target) {
        let _ = writeln!(
            out,
            "  <xs:element name=\"{}\" nillable=\"true\" type=\"{}\"/>",
            escape(element.name.local_name()),
            escape(&prefixes.type_ref(&element.type_ref))
        );
    }

    out.push_str("</xs:schema>\n");
    out
}

fn render_complex(out: &mut String, desc: &ComplexTypeDescriptor, prefixes: &Prefixes) {
    let _ = writeln!(
        out,
        "  <xs:complexType name=\"{}\">",
        escape(desc.name.local_name())
    );
    match &desc.base {
        Some(base) => {
            out.push_str("    <xs:complexContent mixed=\"false\">\n");
            let _ = writeln!(
                out,
                "      <xs:extension base=\"{}\">",
                escape(&prefixes.qualify(base))
            );
            render_sequence(out, &desc.fields, prefixes, "        ");
            out.push_str("      </xs:extension>\n");
            out.push_str("    </xs:complexContent>\n");
        }
        None => render_sequence(out, &desc.fields, prefixes, "    "),
    }
    out.push_str("  </xs:complexType>\n");
}

fn render_sequence(out: &mut String, fields: &[FieldDescriptor], prefixes: &Prefixes, indent: &str) {
    let _ = writeln!(out, "{indent}<xs:sequence>");
    for field in fields {
        let _ = write!(out, "{indent}  <xs:element");
        if field.optional {
            out.push_str(" minOccurs=\"0\"");
        }
        if field.repeated {
            out.push_str(" maxOccurs=\"unbounded\"");
        }
        let _ = write!(
            out,
            " name=\"{}\"",
            escape(&field.name)
        );
        if field.optional {
            out.push_str(" nillable=\"true\"");
        }
        let _ = writeln!(out, " type=\"{}\"/>", escape(&prefixes.type_ref(&field.type_ref)));
    }
    let _ = writeln!(out, "{indent}</xs:sequence>");
}

/// Escape text for use inside a double-quoted attribute.
pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
