// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host primitive names a receiver may instantiate without a registry entry.
//!
//! Anything not in this table and not bound in the registry is refused.

use crate::dynamic::PrimitiveKind;

/// The fixed whitelist.
pub const WHITELIST: [(&str, PrimitiveKind); 15] = [
    ("System.String", PrimitiveKind::String),
    ("System.Boolean", PrimitiveKind::Bool),
    ("System.Byte", PrimitiveKind::U8),
    ("System.SByte", PrimitiveKind::I8),
    ("System.Int16", PrimitiveKind::I16),
    ("System.UInt16", PrimitiveKind::U16),
    ("System.Int32", PrimitiveKind::I32),
    ("System.UInt32", PrimitiveKind::U32),
    ("System.Int64", PrimitiveKind::I64),
    ("System.UInt64", PrimitiveKind::U64),
    ("System.Single", PrimitiveKind::F32),
    ("System.Double", PrimitiveKind::F64),
    ("System.Decimal", PrimitiveKind::Decimal),
    ("System.DateTime", PrimitiveKind::DateTime),
    ("System.Guid", PrimitiveKind::Guid),
];

/// Primitive kind for a whitelisted name. Exact, case-sensitive match.
pub fn whitelisted(name: &str) -> Option<PrimitiveKind> {
    WHITELIST
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_matches_wire_names() {
        for (name, kind) in WHITELIST {
            assert_eq!(kind.wire_name(), Some(name));
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(whitelisted("System.DateTime"), Some(PrimitiveKind::DateTime));
        assert_eq!(whitelisted("system.datetime"), None);
        assert_eq!(whitelisted("System.IO.File"), None);
        assert_eq!(whitelisted("Some.Arbitrary.Type"), None);
    }
}
