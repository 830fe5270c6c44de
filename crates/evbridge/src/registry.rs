// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of synthesized types.
//!
//! Maps a [`QualifiedName`] to the native handle synthesized for it and the
//! structural signature it was synthesized from. A name is bound at most once
//! for the lifetime of the registry; re-binding with the same signature hands
//! back the existing handle, re-binding with a different signature fails.
//!
//! Readers go through an `ArcSwap` snapshot and never take a lock; lookup
//! counters are atomics. Writers
//! serialize on one mutex, build a new map, and publish it in a single store,
//! so a reader sees either none or all of a synthesis batch.

use crate::dynamic::NativeTypeHandle;
use crate::error::{BridgeError, Result};
use crate::schema::QualifiedName;
use crate::signature::StructuralSignature;
use arc_swap::ArcSwap;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Snapshot = HashMap<QualifiedName, Arc<NativeTypeBinding>>;

/// One published binding. Immutable once published.
#[derive(Debug, Clone)]
pub struct NativeTypeBinding {
    pub name: QualifiedName,
    pub handle: NativeTypeHandle,
    pub signature: StructuralSignature,
}

impl NativeTypeBinding {
    pub fn new(name: QualifiedName, handle: NativeTypeHandle, signature: StructuralSignature) -> Self {
        Self {
            name,
            handle,
            signature,
        }
    }
}

/// Lookup statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryStats {
    pub hits: u64,
    pub misses: u64,
    pub published: u64,
    pub conflicts: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    published: AtomicU64,
    conflicts: AtomicU64,
}

/// Proof that the caller holds the registry's synthesis lock.
pub struct SynthesisGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Process component owning every synthesized type.
///
/// Construct one per host and share it (`Arc<TypeRegistry>`); there is no
/// global instance.
pub struct TypeRegistry {
    published: ArcSwap<Snapshot>,
    synthesis: Mutex<()>,
    stats: Counters,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            published: ArcSwap::from_pointee(HashMap::new()),
            synthesis: Mutex::new(()),
            stats: Counters::default(),
        }
    }

    /// Native handle bound to `name`, if any. Lock-free.
    pub fn resolve(&self, name: &QualifiedName) -> Option<NativeTypeHandle> {
        self.binding(name).map(|b| Arc::clone(&b.handle))
    }

    /// Full binding for `name`, if any. Lock-free.
    pub fn binding(&self, name: &QualifiedName) -> Option<Arc<NativeTypeBinding>> {
        let found = self.published.load().get(name).cloned();
        let counter = if found.is_some() {
            &self.stats.hits
        } else {
            &self.stats.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Resolve by the Clark-notation text carried in wire envelopes.
    pub fn resolve_wire_name(&self, wire_name: &str) -> Option<NativeTypeHandle> {
        QualifiedName::parse(wire_name).and_then(|name| self.resolve(&name))
    }

    /// Insert-if-absent.
    ///
    /// Returns the handle now bound to `name`: `handle` when the name was
    /// free, the existing handle when the signatures agree.
    pub fn bind(
        &self,
        name: QualifiedName,
        handle: NativeTypeHandle,
        signature: StructuralSignature,
    ) -> Result<NativeTypeHandle> {
        let guard = self.lock_synthesis();
        let mut bound = self.publish(&guard, vec![NativeTypeBinding::new(name, handle, signature)])?;
        // one entry in, one entry out
        Ok(Arc::clone(&bound.swap_remove(0).handle))
    }

    /// Enter the single synthesis exclusion domain.
    pub fn lock_synthesis(&self) -> SynthesisGuard<'_> {
        SynthesisGuard {
            _guard: self.synthesis.lock(),
        }
    }

    /// Publish a batch atomically.
    ///
    /// Every entry is checked against the current snapshot before anything is
    /// stored; a single conflict rejects the whole batch and leaves the
    /// registry untouched. Entries whose signature matches an existing binding
    /// resolve to that binding. The result is in batch order.
    pub fn publish(
        &self,
        _guard: &SynthesisGuard<'_>,
        batch: Vec<NativeTypeBinding>,
    ) -> Result<Vec<Arc<NativeTypeBinding>>> {
        let current = self.published.load_full();
        let mut next: Option<Snapshot> = None;
        let mut bound = Vec::with_capacity(batch.len());

        for binding in batch {
            let existing = next
                .as_ref()
                .and_then(|n| n.get(&binding.name))
                .or_else(|| current.get(&binding.name));
            match existing {
                Some(existing) if existing.signature == binding.signature => {
                    bound.push(Arc::clone(existing));
                }
                Some(existing) => {
                    self.stats.conflicts.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "[registry] conflict on {}: bound {} incoming {}",
                        binding.name,
                        existing.signature,
                        binding.signature
                    );
                    return Err(BridgeError::TypeConflict {
                        name: binding.name,
                        existing: existing.signature,
                        incoming: binding.signature,
                    });
                }
                None => {
                    let entry = Arc::new(binding);
                    next.get_or_insert_with(|| (*current).clone())
                        .insert(entry.name.clone(), Arc::clone(&entry));
                    bound.push(entry);
                }
            }
        }

        if let Some(next) = next {
            let added = next.len() - current.len();
            self.published.store(Arc::new(next));
            self.stats
                .published
                .fetch_add(added as u64, Ordering::Relaxed);
            log::debug!("[registry] published {} binding(s)", added);
        }
        Ok(bound)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.published.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<QualifiedName> {
        let mut names: Vec<_> = self.published.load().keys().cloned().collect();
        names.sort();
        names
    }

    /// Every binding, sorted by name.
    pub fn bindings(&self) -> Vec<Arc<NativeTypeBinding>> {
        let mut all: Vec<_> = self.published.load().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            published: self.stats.published.load(Ordering::Relaxed),
            conflicts: self.stats.conflicts.load(Ordering::Relaxed),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("bindings", &self.len())
            .finish()
    }
}
