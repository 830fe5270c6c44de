// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Event contracts: reflection data for native Rust event types.
//!
//! `#[derive(Reflect)]` describes a struct to the exporter and the codec.
//! Only structs carrying `#[contract(...)]` are event contracts; a struct
//! without it can still derive `Reflect` to point at a contract base through
//! a `#[member(base)]` field.
//!
//! ```rust
//! use evbridge::contract::{Reflect, TypeRef};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Reflect, Serialize, Deserialize)]
//! #[contract(name = "Quote", namespace = "urn:market")]
//! struct Quote {
//!     #[member]
//!     symbol: String,
//!     #[member]
//!     #[serde(rename = "Bid")]
//!     bid: f64,
//!     internal_seq: u64,
//! }
//!
//! let native = Quote::native_type();
//! assert_eq!(native.qname().unwrap().to_string(), "{urn:market}Quote");
//! assert_eq!(native.members.len(), 2);
//! assert_eq!(native.members[1].name, "Bid");
//! assert!(matches!(native.members[0].type_ref, TypeRef::Primitive(_)));
//! ```

use crate::dynamic::PrimitiveKind;
use crate::schema::QualifiedName;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub use evbridge_derive::Reflect;

/// Namespace prefix for contracts that do not name their namespace.
pub const DEFAULT_NAMESPACE_BASE: &str = "http://schemas.evbridge.dev/";

/// Default contract namespace for a type declared in `module_path`.
///
/// `trading::events` becomes `http://schemas.evbridge.dev/trading/events`.
pub fn default_namespace(module_path: &str) -> String {
    format!("{}{}", DEFAULT_NAMESPACE_BASE, module_path.replace("::", "/"))
}

/// Implemented by `#[derive(Reflect)]`.
pub trait Reflect {
    fn native_type() -> &'static NativeType;
}

/// Opt-in marker data from `#[contract(...)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub name: String,
    pub namespace: String,
}

impl ContractInfo {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    pub fn qname(&self) -> QualifiedName {
        QualifiedName::new(self.namespace.as_str(), self.name.as_str())
    }
}

/// Reflected shape of one native struct.
#[derive(Debug)]
pub struct NativeType {
    /// Rust type path, for diagnostics.
    pub rust_name: &'static str,
    /// `None` when the struct is not an event contract.
    pub contract: Option<ContractInfo>,
    /// Type of the `#[member(base)]` field.
    pub base: Option<fn() -> &'static NativeType>,
    /// `#[member]` fields in declaration order, base field excluded.
    pub members: Vec<NativeMember>,
}

impl NativeType {
    pub fn is_contract(&self) -> bool {
        self.contract.is_some()
    }

    pub fn qname(&self) -> Option<QualifiedName> {
        self.contract.as_ref().map(ContractInfo::qname)
    }

    pub fn base_type(&self) -> Option<&'static NativeType> {
        self.base.map(|base| base())
    }

    /// This type if it is a contract, otherwise the nearest contract on its
    /// base chain.
    pub fn nearest_contract(&'static self) -> Option<&'static NativeType> {
        let mut current = Some(self);
        let mut depth = 0usize;
        while let Some(ty) = current {
            if ty.is_contract() {
                return Some(ty);
            }
            depth += 1;
            if depth > MAX_BASE_DEPTH {
                log::warn!("[contract] base chain of {} is too deep", self.rust_name);
                return None;
            }
            current = ty.base_type();
        }
        None
    }
}

const MAX_BASE_DEPTH: usize = 64;

/// One `#[member]` field of a reflected struct.
#[derive(Debug)]
pub struct NativeMember {
    /// Wire name (serde name of the field).
    pub name: &'static str,
    /// Rust field identifier.
    pub field: &'static str,
    pub type_ref: TypeRef,
    /// `Option<_>` field.
    pub optional: bool,
}

/// Reflected type of a member.
#[derive(Clone)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Sequence(Box<TypeRef>),
    /// Another reflected struct, resolved lazily so recursive types work.
    Native(fn() -> &'static NativeType),
}

impl std::fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "Primitive({:?})", kind),
            Self::Sequence(inner) => write!(f, "Sequence({:?})", inner),
            Self::Native(native) => write!(f, "Native({})", native().rust_name),
        }
    }
}

/// Field types usable in a `Reflect` struct.
pub trait MemberType {
    const OPTIONAL: bool = false;

    fn type_ref() -> TypeRef;
}

macro_rules! primitive_member {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl MemberType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::Primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

primitive_member! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    Decimal => Decimal,
    DateTime<Utc> => DateTime,
    Uuid => Guid,
}

impl<T: MemberType> MemberType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::Sequence(Box::new(T::type_ref()))
    }
}

impl<T: MemberType> MemberType for Option<T> {
    const OPTIONAL: bool = true;

    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: MemberType> MemberType for Box<T> {
    const OPTIONAL: bool = T::OPTIONAL;

    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Reflect, Serialize, Deserialize)]
    #[contract(name = "Entity", namespace = "urn:test")]
    struct Entity {
        #[member]
        id: Uuid,
    }

    #[derive(Reflect, Serialize, Deserialize)]
    struct LocalEntity {
        #[member(base)]
        #[serde(flatten)]
        base: Entity,
        scratch: Vec<u8>,
    }

    #[derive(Reflect, Serialize, Deserialize)]
    #[contract]
    struct Defaulted {
        #[member]
        when: Option<DateTime<Utc>>,
        #[member]
        tags: Vec<String>,
        #[member]
        child: Option<Box<Defaulted>>,
    }

    #[test]
    fn test_default_namespace() {
        assert_eq!(
            default_namespace("trading::events"),
            "http://schemas.evbridge.dev/trading/events"
        );
        let info = Defaulted::native_type().contract.as_ref().expect("contract");
        assert_eq!(info.name, "Defaulted");
        assert!(info.namespace.starts_with(DEFAULT_NAMESPACE_BASE));
        assert!(info.namespace.ends_with("contract/tests"));
    }

    #[test]
    fn test_member_shapes() {
        let native = Defaulted::native_type();
        assert_eq!(native.members.len(), 3);

        let when = &native.members[0];
        assert!(when.optional);
        assert!(matches!(when.type_ref, TypeRef::Primitive(PrimitiveKind::DateTime)));

        let tags = &native.members[1];
        assert!(!tags.optional);
        assert!(matches!(&tags.type_ref, TypeRef::Sequence(inner)
            if matches!(**inner, TypeRef::Primitive(PrimitiveKind::String))));

        let child = &native.members[2];
        assert!(child.optional);
        match &child.type_ref {
            TypeRef::Native(f) => assert!(std::ptr::eq(f(), native)),
            other => panic!("expected native ref, got {:?}", other),
        }
    }

    #[test]
    fn test_nearest_contract_walks_base() {
        let local = LocalEntity::native_type();
        assert!(!local.is_contract());
        assert!(local.members.is_empty());

        let nearest = local.nearest_contract().expect("Entity is a contract");
        assert!(std::ptr::eq(nearest, Entity::native_type()));
        assert_eq!(nearest.qname(), Some(QualifiedName::new("urn:test", "Entity")));
    }
}
