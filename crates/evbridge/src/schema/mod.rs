// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema model: qualified names, complex-type descriptors, XSD import and
//! XSD rendering.
//!
//! # Example
//!
//! ```rust
//! use evbridge::schema::{QualifiedName, SchemaSet};
//!
//! let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
//!                  xmlns:tns="urn:trading" targetNamespace="urn:trading">
//!   <xs:complexType name="Trade">
//!     <xs:sequence>
//!       <xs:element name="symbol" type="xs:string"/>
//!       <xs:element name="price" type="xs:double"/>
//!     </xs:sequence>
//!   </xs:complexType>
//!   <xs:element name="Trade" type="tns:Trade"/>
//! </xs:schema>"#;
//!
//! let model = SchemaSet::parse(&[xsd]).unwrap().build().unwrap();
//! let trade = model.require_complex(&QualifiedName::new("urn:trading", "Trade")).unwrap();
//! assert_eq!(trade.fields.len(), 2);
//! ```

mod error;
mod model;
mod qname;
mod writer;
mod xsd;

pub use error::SchemaError;
pub use model::{
    ComplexTypeDescriptor, DescriptorSource, ElementDecl, FieldDescriptor, SchemaModel,
    TypeReference,
};
pub use qname::QualifiedName;
pub use writer::{render_documents, ElementForm, XsdDocument};
pub use xsd::SchemaSet;

pub(crate) use writer::escape;

/// XML Schema namespace.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace of the serialization helper types (`guid`, `char`, `duration`)
/// used by the remote engine's schema exporter.
pub const SERIALIZATION_NAMESPACE: &str = "http://schemas.microsoft.com/2003/10/Serialization/";

#[cfg(test)]
mod tests;
