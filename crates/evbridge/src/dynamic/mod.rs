// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic event types.
//!
//! Schema-driven records that stand in for natively compiled types: a
//! [`TypeDescriptor`] carries the shape, [`DynamicData`] carries one
//! instance of it. Synthesized types are handed out as
//! `Arc<TypeDescriptor>` handles, so two holders of the same binding share
//! one descriptor.
//!
//! # Example
//!
//! ```rust
//! use evbridge::dynamic::{DynamicData, PrimitiveKind, TypeDescriptorBuilder};
//! use std::sync::Arc;
//!
//! let descriptor = Arc::new(TypeDescriptorBuilder::new("Trade")
//!     .field("symbol", PrimitiveKind::String)
//!     .field("price", PrimitiveKind::F64)
//!     .build());
//!
//! let mut data = DynamicData::new(&descriptor);
//! data.set("symbol", "ACME").unwrap();
//! data.set("price", 101.25f64).unwrap();
//!
//! let price: f64 = data.get("price").unwrap();
//! assert_eq!(price, 101.25);
//! ```

mod builder;
mod dynamic_data;
mod type_descriptor;
mod value;

pub use builder::TypeDescriptorBuilder;
pub use dynamic_data::{DynamicData, DynamicDataError, FromDynamicValue, IntoDynamicValue};
pub use type_descriptor::{
    MemberDescriptor, PrimitiveKind, SequenceDescriptor, TypeDescriptor, TypeKind,
};
pub use value::DynamicValue;

/// Shared handle to a synthesized type.
pub type NativeTypeHandle = std::sync::Arc<TypeDescriptor>;
