// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Namespace-qualified type and element names.

use std::fmt;
use std::sync::Arc;

/// (namespace, local-name) pair.
///
/// The text form is Clark notation: `{namespace}local`, or just `local`
/// when the namespace is empty. This is the form carried in the
/// `eventType` field of wire envelopes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    namespace: Arc<str>,
    local: Arc<str>,
}

impl QualifiedName {
    pub fn new(namespace: impl AsRef<str>, local: impl AsRef<str>) -> Self {
        Self {
            namespace: Arc::from(namespace.as_ref()),
            local: Arc::from(local.as_ref()),
        }
    }

    /// Name without a namespace.
    pub fn local(local: impl AsRef<str>) -> Self {
        Self::new("", local)
    }

    /// Parse the Clark-notation text form.
    ///
    /// Returns `None` for empty local names or unbalanced braces.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('{') {
            let (ns, local) = rest.split_once('}')?;
            if local.is_empty() || local.contains(['{', '}']) {
                return None;
            }
            Some(Self::new(ns, local))
        } else if text.is_empty() || text.contains(['{', '}']) {
            None
        } else {
            Some(Self::local(text))
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Same namespace, different local name.
    pub fn with_local(&self, local: impl AsRef<str>) -> Self {
        Self {
            namespace: Arc::clone(&self.namespace),
            local: Arc::from(local.as_ref()),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self)
    }
}
