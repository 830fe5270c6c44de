// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XSD import and rendering tests.

use super::*;
use crate::dynamic::PrimitiveKind;

const ORDERS_XSD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:ser="http://schemas.microsoft.com/2003/10/Serialization/"
           xmlns:tns="urn:orders"
           elementFormDefault="qualified"
           targetNamespace="urn:orders">
  <xs:annotation><xs:documentation>orders</xs:documentation></xs:annotation>
  <xs:complexType name="Entity">
    <xs:sequence>
      <xs:element name="Id" type="ser:guid"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="Order">
    <xs:complexContent mixed="false">
      <xs:extension base="tns:Entity">
        <xs:sequence>
          <xs:element name="Symbol" type="tns:Ticker"/>
          <xs:element minOccurs="0" name="Note" nillable="true" type="xs:string"/>
          <xs:element name="Lines" type="tns:ArrayOfLine"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="Line">
    <xs:sequence>
      <xs:element name="Qty" type="xs:int"/>
      <xs:element name="Price" type="xs:decimal"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="ArrayOfLine">
    <xs:sequence>
      <xs:element minOccurs="0" maxOccurs="unbounded" name="Line" type="tns:Line"/>
    </xs:sequence>
  </xs:complexType>
  <xs:simpleType name="Ticker">
    <xs:restriction base="xs:token">
      <xs:maxLength value="8"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:element name="Order" nillable="true" type="tns:Order"/>
</xs:schema>"#;

fn qn(local: &str) -> QualifiedName {
    QualifiedName::new("urn:orders", local)
}

#[test]
fn test_parse_orders_schema() {
    let model = SchemaSet::parse(&[ORDERS_XSD])
        .expect("parse")
        .build()
        .expect("build");

    let order = model.require_complex(&qn("Order")).expect("Order");
    assert_eq!(order.base, Some(qn("Entity")));
    let names: Vec<_> = order.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Symbol", "Note", "Lines"]);

    // simpleType restriction chain reduces to the primitive
    assert_eq!(
        order.fields[0].type_ref,
        TypeReference::Primitive(PrimitiveKind::String)
    );
    assert!(order.fields[1].optional);
    assert_eq!(order.fields[2].type_ref, TypeReference::Complex(qn("ArrayOfLine")));

    let entity = model.require_complex(&qn("Entity")).expect("Entity");
    assert_eq!(
        entity.fields[0].type_ref,
        TypeReference::Primitive(PrimitiveKind::Guid)
    );

    assert!(model.require_complex(&qn("ArrayOfLine")).expect("array").is_collection());
    assert_eq!(
        model.require_element(&qn("Order")).expect("element").type_ref,
        TypeReference::Complex(qn("Order"))
    );
}

#[test]
fn test_cross_document_references() {
    let common = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:common">
  <xs:complexType name="Money">
    <xs:sequence>
      <xs:element name="Amount" type="xs:decimal"/>
      <xs:element name="Currency" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#;
    let payments = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:c="urn:common" targetNamespace="urn:pay">
  <xs:import namespace="urn:common"/>
  <xs:element name="Payment">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Total" type="c:Money"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    // referencing document first: resolution waits for build()
    let model = SchemaSet::parse(&[payments, common])
        .expect("parse")
        .build()
        .expect("build");

    let payment = model
        .require_complex(&QualifiedName::new("urn:pay", "Payment"))
        .expect("anonymous type named after element");
    assert_eq!(
        payment.fields[0].type_ref,
        TypeReference::Complex(QualifiedName::new("urn:common", "Money"))
    );
}

#[test]
fn test_missing_element_ref_names_the_element() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="urn:t" targetNamespace="urn:t">
  <xs:complexType name="Holder">
    <xs:sequence>
      <xs:element ref="tns:Ghost"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#;

    let err = SchemaSet::parse(&[xsd])
        .expect("parse")
        .build()
        .expect_err("Ghost is not declared");
    assert!(
        matches!(&err, SchemaError::MissingElement(name) if *name == QualifiedName::new("urn:t", "Ghost")),
        "{err}"
    );
}

#[test]
fn test_element_ref_takes_referenced_type() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="urn:t" targetNamespace="urn:t">
  <xs:element name="Stamp" type="xs:dateTime"/>
  <xs:complexType name="Holder">
    <xs:sequence>
      <xs:element ref="tns:Stamp" maxOccurs="4"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#;

    let model = SchemaSet::parse(&[xsd]).expect("parse").build().expect("build");
    let holder = model
        .require_complex(&QualifiedName::new("urn:t", "Holder"))
        .expect("Holder");
    assert_eq!(holder.fields[0].name, "Stamp");
    assert!(holder.fields[0].repeated);
    assert_eq!(
        holder.fields[0].type_ref,
        TypeReference::Primitive(PrimitiveKind::DateTime)
    );
}

#[test]
fn test_missing_type_reference() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="urn:t" targetNamespace="urn:t">
  <xs:element name="Thing" type="tns:Nowhere"/>
</xs:schema>"#;
    let err = SchemaSet::parse(&[xsd]).expect("parse").build().expect_err("missing");
    assert!(matches!(err, SchemaError::MissingType(_)));
}

#[test]
fn test_rejects_non_schema_root() {
    let err = SchemaSet::parse(&["<dictionary/>"]).expect_err("not xsd");
    assert!(matches!(err, SchemaError::NotASchema(root) if root == "dictionary"));
}

#[test]
fn test_rejects_choice() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:complexType name="Either">
    <xs:choice>
      <xs:element name="a" type="xs:int"/>
      <xs:element name="b" type="xs:string"/>
    </xs:choice>
  </xs:complexType>
</xs:schema>"#;
    let err = SchemaSet::parse(&[xsd]).expect_err("choice unsupported");
    assert!(matches!(err, SchemaError::Unsupported { construct, .. } if construct == "choice"));
}

#[test]
fn test_invalid_occurs() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:complexType name="Bad">
    <xs:sequence>
      <xs:element name="a" type="xs:int" maxOccurs="many"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#;
    assert!(matches!(
        SchemaSet::parse(&[xsd]),
        Err(SchemaError::InvalidOccurs(text)) if text == "many"
    ));
}

#[test]
fn test_unknown_prefix() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:element name="a" type="zz:Thing"/>
</xs:schema>"#;
    assert!(matches!(
        SchemaSet::parse(&[xsd]),
        Err(SchemaError::UnknownPrefix(prefix)) if prefix == "zz"
    ));
}

#[test]
fn test_same_document_twice_is_idempotent() {
    let once = SchemaSet::parse(&[ORDERS_XSD]).expect("parse").build().expect("build");
    let twice = SchemaSet::parse(&[ORDERS_XSD, ORDERS_XSD])
        .expect("parse")
        .build()
        .expect("build");
    assert_eq!(once, twice);
}

#[test]
fn test_render_then_parse_preserves_model() {
    let model = SchemaSet::parse(&[ORDERS_XSD]).expect("parse").build().expect("build");
    let docs = render_documents(&model, ElementForm::Qualified);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].target_namespace, "urn:orders");

    let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
    let reparsed = SchemaSet::parse(&texts).expect("reparse").build().expect("rebuild");
    assert_eq!(
        reparsed.require_complex(&qn("Order")).expect("Order"),
        model.require_complex(&qn("Order")).expect("Order")
    );
    assert_eq!(
        reparsed.require_complex(&qn("ArrayOfLine")).expect("array"),
        model.require_complex(&qn("ArrayOfLine")).expect("array")
    );
}

#[test]
fn test_render_multiple_namespaces_imports() {
    let mut model = SchemaModel::new();
    let money = QualifiedName::new("urn:common", "Money");
    model
        .insert_complex(ComplexTypeDescriptor::new(
            money.clone(),
            vec![FieldDescriptor::primitive("Amount", PrimitiveKind::Decimal)],
        ))
        .expect("money");
    model
        .insert_complex(ComplexTypeDescriptor::new(
            QualifiedName::new("urn:pay", "Payment"),
            vec![FieldDescriptor::complex("Total", money)],
        ))
        .expect("payment");

    let docs = render_documents(&model, ElementForm::Unqualified);
    assert_eq!(docs.len(), 2);
    let pay = docs
        .iter()
        .find(|d| d.target_namespace == "urn:pay")
        .expect("pay doc");
    assert!(pay.text.contains("<xs:import namespace=\"urn:common\"/>"));
    assert!(pay.text.contains("type=\"q1:Money\""));
    assert!(pay.text.contains("elementFormDefault=\"unqualified\""));

    let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
    let reparsed = SchemaSet::parse(&texts).expect("reparse").build().expect("rebuild");
    assert_eq!(reparsed.complex_type_count(), 2);
}
