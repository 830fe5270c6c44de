// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XSD document parsing.
//!
//! Documents are parsed one at a time into raw declarations whose names are
//! already namespace-resolved; [`SchemaSet::build`] then resolves type and
//! element references across every document of the set, so a reference may
//! point into a document added later.

use super::{
    ComplexTypeDescriptor, ElementDecl, FieldDescriptor, QualifiedName, SchemaError, SchemaModel,
    TypeReference, XSD_NAMESPACE,
};
use crate::dynamic::PrimitiveKind;
use roxmltree::{Document, Node};
use std::collections::{HashMap, HashSet};

/// What a field or element points at, before cross-document resolution.
#[derive(Debug, Clone, PartialEq)]
enum RawTarget {
    /// `type="prefix:Name"`, simple or complex.
    Named(QualifiedName),
    /// `ref="prefix:element"`.
    ElementRef(QualifiedName),
    /// Inline anonymous simple type, already reduced to its primitive.
    Primitive(PrimitiveKind),
}

#[derive(Debug, Clone)]
struct RawField {
    name: String,
    target: RawTarget,
    repeated: bool,
    optional: bool,
}

#[derive(Debug, Clone)]
struct RawComplex {
    name: QualifiedName,
    fields: Vec<RawField>,
    base: Option<QualifiedName>,
}

#[derive(Debug, Clone)]
enum RawSimple {
    Restriction(QualifiedName),
    Primitive(PrimitiveKind),
}

/// A set of XSD documents imported together.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    complex: Vec<RawComplex>,
    simple: HashMap<QualifiedName, RawSimple>,
    elements: Vec<(QualifiedName, RawTarget)>,
    documents: usize,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete set in one go.
    pub fn parse<S: AsRef<str>>(documents: &[S]) -> Result<Self, SchemaError> {
        let mut set = Self::new();
        for doc in documents {
            set.add_document(doc.as_ref())?;
        }
        Ok(set)
    }

    /// Number of documents added so far.
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// Parse one XSD document into the set.
    pub fn add_document(&mut self, xsd: &str) -> Result<&mut Self, SchemaError> {
        let doc = Document::parse(xsd)?;
        let root = doc.root_element();
        if !is_xs(&root, "schema") {
            return Err(SchemaError::NotASchema(root.tag_name().name().to_string()));
        }

        let target_ns = root.attribute("targetNamespace").unwrap_or("");
        let mut parser = DocumentParser {
            target_ns,
            set: self,
        };

        for child in xs_children(&root) {
            match child.tag_name().name() {
                "element" => parser.top_level_element(&child)?,
                "complexType" => {
                    let name = required_attr(&child, "name")?;
                    let qname = QualifiedName::new(target_ns, name);
                    parser.complex_type(&child, qname)?;
                }
                "simpleType" => {
                    let name = required_attr(&child, "name")?;
                    let simple = parser.simple_type(&child)?;
                    parser
                        .set
                        .simple
                        .insert(QualifiedName::new(target_ns, name), simple);
                }
                "import" | "include" | "attribute" | "attributeGroup" => {
                    log::debug!(
                        "[xsd] skipping top-level <xs:{}> in {}",
                        child.tag_name().name(),
                        target_ns
                    );
                }
                other => return Err(SchemaError::unsupported("schema", other)),
            }
        }

        self.documents += 1;
        Ok(self)
    }

    /// Resolve every reference across the set and produce the model.
    pub fn build(&self) -> Result<SchemaModel, SchemaError> {
        let mut model = SchemaModel::new();
        let element_types: HashMap<&QualifiedName, &RawTarget> =
            self.elements.iter().map(|(name, target)| (name, target)).collect();

        let complex_names: HashSet<&QualifiedName> = self.complex.iter().map(|c| &c.name).collect();
        let resolver = Resolver {
            set: self,
            complex_names: &complex_names,
            element_types: &element_types,
        };

        for raw in &self.complex {
            let mut fields = Vec::with_capacity(raw.fields.len());
            for field in &raw.fields {
                let type_ref = resolver.target(&field.target)?;
                fields.push(FieldDescriptor {
                    name: field.name.clone(),
                    type_ref,
                    repeated: field.repeated,
                    optional: field.optional,
                });
            }
            let base = match &raw.base {
                Some(base) if complex_names.contains(base) => Some(base.clone()),
                Some(base) => return Err(SchemaError::MissingType(base.clone())),
                None => None,
            };
            model.insert_complex(ComplexTypeDescriptor {
                name: raw.name.clone(),
                fields,
                base,
            })?;
        }

        for (name, target) in &self.elements {
            let type_ref = resolver.target(target)?;
            model.insert_element(ElementDecl {
                name: name.clone(),
                type_ref,
            })?;
        }

        model.validate()?;
        Ok(model)
    }
}

struct Resolver<'a> {
    set: &'a SchemaSet,
    complex_names: &'a HashSet<&'a QualifiedName>,
    element_types: &'a HashMap<&'a QualifiedName, &'a RawTarget>,
}

impl Resolver<'_> {
    fn target(&self, target: &RawTarget) -> Result<TypeReference, SchemaError> {
        match target {
            RawTarget::Primitive(kind) => Ok(TypeReference::Primitive(*kind)),
            RawTarget::Named(name) => self.named(name),
            RawTarget::ElementRef(element) => {
                let inner = self
                    .element_types
                    .get(element)
                    .ok_or_else(|| SchemaError::MissingElement(element.clone()))?;
                match inner {
                    RawTarget::ElementRef(_) => Err(SchemaError::unsupported(
                        element.to_string(),
                        "element ref to element ref",
                    )),
                    other => self.target(other),
                }
            }
        }
    }

    /// Built-ins first, then simple-type restriction chains, then complex types.
    fn named(&self, name: &QualifiedName) -> Result<TypeReference, SchemaError> {
        let mut current = name.clone();
        let mut visited = HashSet::new();
        loop {
            if let Some(kind) = PrimitiveKind::from_xsd(current.namespace(), current.local_name()) {
                return Ok(TypeReference::Primitive(kind));
            }
            if let Some(simple) = self.set.simple.get(&current) {
                if !visited.insert(current.clone()) {
                    return Err(SchemaError::unsupported(name.to_string(), "circular restriction"));
                }
                match simple {
                    RawSimple::Primitive(kind) => return Ok(TypeReference::Primitive(*kind)),
                    RawSimple::Restriction(base) => {
                        current = base.clone();
                        continue;
                    }
                }
            }
            if self.complex_names.contains(&current) {
                return Ok(TypeReference::Complex(current));
            }
            return Err(SchemaError::MissingType(current));
        }
    }
}

struct DocumentParser<'s, 'd> {
    target_ns: &'d str,
    set: &'s mut SchemaSet,
}

impl DocumentParser<'_, '_> {
    fn top_level_element(&mut self, node: &Node) -> Result<(), SchemaError> {
        let name = required_attr(node, "name")?;
        let qname = QualifiedName::new(self.target_ns, name);

        let target = if let Some(type_attr) = node.attribute("type") {
            RawTarget::Named(resolve_prefixed(node, type_attr)?)
        } else if let Some(inline) = xs_child(node, "complexType") {
            // Anonymous top-level complex types take the element's name.
            self.complex_type(&inline, qname.clone())?;
            RawTarget::Named(qname.clone())
        } else if let Some(inline) = xs_child(node, "simpleType") {
            self.inline_simple(&inline)?
        } else {
            return Err(SchemaError::unsupported(qname.to_string(), "anyType element"));
        };

        self.set.elements.push((qname, target));
        Ok(())
    }

    fn complex_type(&mut self, node: &Node, name: QualifiedName) -> Result<(), SchemaError> {
        let mut fields = Vec::new();
        let mut base = None;

        for child in xs_children(node) {
            match child.tag_name().name() {
                "sequence" | "all" => self.particle(&child, &name, &mut fields)?,
                "complexContent" => {
                    let ext = xs_child(&child, "extension").ok_or_else(|| {
                        SchemaError::unsupported(name.to_string(), "complexContent without extension")
                    })?;
                    let base_attr = required_attr(&ext, "base")?;
                    base = Some(resolve_prefixed(&ext, base_attr)?);
                    for part in xs_children(&ext) {
                        match part.tag_name().name() {
                            "sequence" | "all" => self.particle(&part, &name, &mut fields)?,
                            "attribute" | "attributeGroup" => {}
                            other => return Err(SchemaError::unsupported(name.to_string(), other)),
                        }
                    }
                }
                "attribute" | "attributeGroup" | "anyAttribute" => {
                    log::debug!("[xsd] ignoring attribute declaration in {}", name);
                }
                other => return Err(SchemaError::unsupported(name.to_string(), other)),
            }
        }

        self.set.complex.push(RawComplex { name, fields, base });
        Ok(())
    }

    /// Flatten a `sequence`/`all` particle into ordered fields.
    fn particle(
        &mut self,
        node: &Node,
        owner: &QualifiedName,
        fields: &mut Vec<RawField>,
    ) -> Result<(), SchemaError> {
        for child in xs_children(node) {
            match child.tag_name().name() {
                "element" => {
                    let field = self.field(&child, owner)?;
                    fields.push(field);
                }
                "sequence" => self.particle(&child, owner, fields)?,
                other => return Err(SchemaError::unsupported(owner.to_string(), other)),
            }
        }
        Ok(())
    }

    fn field(&mut self, node: &Node, owner: &QualifiedName) -> Result<RawField, SchemaError> {
        let min = parse_occurs(node.attribute("minOccurs"))?.unwrap_or(1);
        let max = parse_occurs(node.attribute("maxOccurs"))?;
        let repeated = max.map_or(true, |max| max > 1);
        let nillable = node.attribute("nillable") == Some("true");
        let optional = min == 0 || nillable;

        if let Some(ref_attr) = node.attribute("ref") {
            let element = resolve_prefixed(node, ref_attr)?;
            return Ok(RawField {
                name: element.local_name().to_string(),
                target: RawTarget::ElementRef(element),
                repeated,
                optional,
            });
        }

        let name = required_attr(node, "name")?;
        let target = if let Some(type_attr) = node.attribute("type") {
            RawTarget::Named(resolve_prefixed(node, type_attr)?)
        } else if let Some(inline) = xs_child(node, "complexType") {
            let inline_name = owner.with_local(format!("{}_{}", owner.local_name(), name));
            self.complex_type(&inline, inline_name.clone())?;
            RawTarget::Named(inline_name)
        } else if let Some(inline) = xs_child(node, "simpleType") {
            self.inline_simple(&inline)?
        } else {
            return Err(SchemaError::unsupported(
                format!("{}.{}", owner, name),
                "anyType element",
            ));
        };

        Ok(RawField {
            name: name.to_string(),
            target,
            repeated,
            optional,
        })
    }

    fn simple_type(&self, node: &Node) -> Result<RawSimple, SchemaError> {
        let context = node.attribute("name").unwrap_or("anonymous simpleType");
        if let Some(restriction) = xs_child(node, "restriction") {
            let base = required_attr(&restriction, "base")?;
            let base = resolve_prefixed(&restriction, base)?;
            return Ok(
                match PrimitiveKind::from_xsd(base.namespace(), base.local_name()) {
                    Some(kind) => RawSimple::Primitive(kind),
                    None => RawSimple::Restriction(base),
                },
            );
        }
        let construct = xs_children(node)
            .next()
            .map(|n| n.tag_name().name().to_string())
            .unwrap_or_else(|| "empty simpleType".to_string());
        Err(SchemaError::unsupported(context, construct))
    }

    fn inline_simple(&self, node: &Node) -> Result<RawTarget, SchemaError> {
        match self.simple_type(node)? {
            RawSimple::Primitive(kind) => Ok(RawTarget::Primitive(kind)),
            RawSimple::Restriction(base) => Ok(RawTarget::Named(base)),
        }
    }
}

fn is_xs(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
        && node.tag_name().name() == name
}

/// XSD element children, without annotations.
fn xs_children<'a, 'input>(node: &Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| {
        n.is_element()
            && n.tag_name().namespace() == Some(XSD_NAMESPACE)
            && n.tag_name().name() != "annotation"
    })
}

fn xs_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_xs(n, name))
}

fn required_attr<'a>(node: &Node<'a, '_>, attribute: &'static str) -> Result<&'a str, SchemaError> {
    node.attribute(attribute)
        .ok_or_else(|| SchemaError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute,
        })
}

/// Resolve a `prefix:local` attribute value against the in-scope namespaces.
fn resolve_prefixed(node: &Node, value: &str) -> Result<QualifiedName, SchemaError> {
    match value.split_once(':') {
        Some((prefix, local)) => {
            let ns = node
                .lookup_namespace_uri(Some(prefix))
                .ok_or_else(|| SchemaError::UnknownPrefix(prefix.to_string()))?;
            Ok(QualifiedName::new(ns, local))
        }
        None => {
            let ns = node.lookup_namespace_uri(None).unwrap_or("");
            Ok(QualifiedName::new(ns, value))
        }
    }
}

/// `None` means unbounded.
fn parse_occurs(value: Option<&str>) -> Result<Option<u64>, SchemaError> {
    match value.map(str::trim) {
        None => Ok(Some(1)),
        Some("unbounded") => Ok(None),
        Some(text) => text
            .parse::<u64>()
            .map(Some)
            .map_err(|_| SchemaError::InvalidOccurs(text.to_string())),
    }
}
