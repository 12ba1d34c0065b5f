//! Per-request resolution cache and cycle guard.
//!
//! The cache is the arena every resolved type of one request lives in. It is
//! created for a single top-level request, threaded through every recursive
//! resolution, and dropped with it; it is never reused after the source may
//! have changed.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::TypeKey;
use super::diagnostics::DiagnosticCollector;
use super::resolved::ResolvedClass;

#[derive(Clone, Debug)]
enum CacheEntry {
    /// Resolution of this type is on the call stack.
    InProgress,
    /// Final result; `None` means no declaration was found.
    Done(Option<Arc<ResolvedClass>>),
}

/// State of a cache slot as seen by the resolver.
#[derive(Clone, Debug)]
pub(crate) enum CacheLookup {
    Absent,
    InProgress,
    Done(Option<Arc<ResolvedClass>>),
}

/// Memo table for one resolution request.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: FxHashMap<TypeKey, CacheEntry>,
    /// In-progress types some descendant edge ran back into.
    cycle_hits: FxHashSet<TypeKey>,
    /// Current nesting of in-progress resolutions.
    depth: usize,
    /// Edges cut by the depth limit so far.
    depth_cuts: usize,
    diagnostics: DiagnosticCollector,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished resolution of `name`, if this request produced one.
    pub fn get(&self, name: &str) -> Option<Arc<ResolvedClass>> {
        match self.entries.get(&TypeKey::new(name)) {
            Some(CacheEntry::Done(resolved)) => resolved.clone(),
            _ => None,
        }
    }

    pub fn is_in_progress(&self, name: &str) -> bool {
        matches!(self.entries.get(&TypeKey::new(name)), Some(CacheEntry::InProgress))
    }

    /// Number of names looked up so far, found or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut DiagnosticCollector {
        &mut self.diagnostics
    }

    pub(crate) fn lookup(&self, key: &TypeKey) -> CacheLookup {
        match self.entries.get(key) {
            None => CacheLookup::Absent,
            Some(CacheEntry::InProgress) => CacheLookup::InProgress,
            Some(CacheEntry::Done(resolved)) => CacheLookup::Done(resolved.clone()),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn record_depth_cut(&mut self) {
        self.depth_cuts += 1;
    }

    pub(crate) fn depth_cuts(&self) -> usize {
        self.depth_cuts
    }

    /// Mark `key` as on the call stack.
    pub(crate) fn begin(&mut self, key: TypeKey) {
        self.entries.insert(key, CacheEntry::InProgress);
        self.depth += 1;
    }

    /// Store the final result for `key`.
    pub(crate) fn finish(&mut self, key: TypeKey, resolved: Option<Arc<ResolvedClass>>) {
        self.cycle_hits.remove(&key);
        self.entries.insert(key, CacheEntry::Done(resolved));
        self.depth = self.depth.saturating_sub(1);
    }

    /// Drop the in-progress marker of a resolution that failed or that was
    /// truncated by the depth limit, so a later lookup starts over.
    pub(crate) fn abandon(&mut self, key: &TypeKey) {
        self.cycle_hits.remove(key);
        self.entries.remove(key);
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn record_cycle_hit(&mut self, key: TypeKey) {
        self.cycle_hits.insert(key);
    }

    /// Whether the edge just resolved from `key` ran back into `key`.
    /// Clears the flag so the next edge starts clean.
    pub(crate) fn take_cycle_hit(&mut self, key: &TypeKey) -> bool {
        self.cycle_hits.remove(key)
    }
}
