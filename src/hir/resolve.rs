//! Class resolution: computing the resolved view of a class-like type.
//!
//! # Algorithm
//!
//! 1. **Cache check** - the per-request [`ResolutionCache`] answers repeat
//!    lookups and detects cycles through its in-progress markers
//! 2. **Declaration fetch** - the first candidate from the
//!    [`DeclarationStore`] is used
//! 3. **Supertypes** - parent, then interfaces, then traits, each resolved
//!    recursively (and strictly in sequence) with the same cache
//! 4. **Members** - merged by [`merge`](super::merge) in precedence order
//! 5. **Extensions** - post-merge hooks, each isolated from the others
//!
//! Everything that goes wrong in steps 2-5 because of the *source* degrades
//! the result and records a diagnostic. Only store failures are returned as
//! errors.

use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture, Either};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::base::TypeKey;
use super::cache::{CacheLookup, ResolutionCache};
use super::decl::ClassDecl;
use super::extension::{ClassResolverExtension, DocTagExtension};
use super::merge::merge_class_members;
use super::resolved::ResolvedClass;
use super::store::{DeclarationStore, StoreError};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tunables of a [`ClassResolver`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ResolverConfig {
    /// Deepest supertype nesting followed before giving up on an edge.
    pub max_depth: usize,
    /// Run the built-in [`DocTagExtension`] before registered extensions.
    pub doc_tags: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            doc_tags: true,
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Outcome of following one supertype edge.
#[derive(Debug)]
enum Edge {
    Found(Arc<ResolvedClass>),
    Missing,
    Cycle,
    TooDeep,
}

impl Edge {
    fn into_found(self) -> Option<Arc<ResolvedClass>> {
        match self {
            Edge::Found(class) => Some(class),
            _ => None,
        }
    }
}

/// Resolves class-like types against a declaration store.
///
/// The resolver holds no per-request state; every top-level call gets its
/// own cache, so concurrent calls never observe each other.
pub struct ClassResolver {
    store: Arc<dyn DeclarationStore>,
    extensions: Vec<Arc<dyn ClassResolverExtension>>,
    doc_tags: DocTagExtension,
    config: ResolverConfig,
}

impl ClassResolver {
    pub fn new(store: Arc<dyn DeclarationStore>) -> Self {
        Self {
            store,
            extensions: Vec::new(),
            doc_tags: DocTagExtension::new(),
            config: ResolverConfig::default(),
        }
    }

    /// Register an extension; extensions run in registration order.
    pub fn with_extension(mut self, extension: Arc<dyn ClassResolverExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DeclarationStore> {
        &self.store
    }

    /// Resolve `name` with a fresh cache.
    pub async fn resolve(&self, name: &str) -> Result<Option<Arc<ResolvedClass>>, StoreError> {
        let mut cache = ResolutionCache::new();
        self.resolve_with_cache(name, &mut cache).await
    }

    /// Resolve `name`, sharing `cache` with earlier calls of the same request.
    pub async fn resolve_with_cache(
        &self,
        name: &str,
        cache: &mut ResolutionCache,
    ) -> Result<Option<Arc<ResolvedClass>>, StoreError> {
        Ok(self.resolve_edge(name, cache).await?.into_found())
    }

    /// Resolve `name` unless `token` is cancelled first, in which case the
    /// partial work is dropped and `Ok(None)` is returned.
    pub async fn resolve_until_cancelled(
        &self,
        name: &str,
        token: &CancellationToken,
    ) -> Result<Option<Arc<ResolvedClass>>, StoreError> {
        if token.is_cancelled() {
            return Ok(None);
        }
        let resolution = pin!(self.resolve(name));
        let cancelled = pin!(token.cancelled());
        match future::select(resolution, cancelled).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                debug!(class = name, "resolution cancelled");
                Ok(None)
            }
        }
    }

    /// Declared parent class name of `name`, without resolving anything.
    pub async fn parent_name(&self, name: &str) -> Result<Option<SmolStr>, StoreError> {
        let candidates = self.store.get_by_name(name).await?;
        Ok(candidates.first().and_then(|decl| decl.parent_name.clone()))
    }

    fn resolve_edge<'a>(
        &'a self,
        name: &'a str,
        cache: &'a mut ResolutionCache,
    ) -> BoxFuture<'a, Result<Edge, StoreError>> {
        async move {
            let key = TypeKey::new(name);
            match cache.lookup(&key) {
                CacheLookup::Done(Some(class)) => {
                    trace!(class = %class.name, "resolution cache hit");
                    return Ok(Edge::Found(class));
                }
                CacheLookup::Done(None) => return Ok(Edge::Missing),
                CacheLookup::InProgress => {
                    debug!(class = name, "cyclic reference cut");
                    cache.record_cycle_hit(key);
                    return Ok(Edge::Cycle);
                }
                CacheLookup::Absent => {}
            }

            if cache.depth() >= self.config.max_depth {
                warn!(class = name, limit = self.config.max_depth, "supertype chain too deep");
                cache.record_depth_cut();
                return Ok(Edge::TooDeep);
            }

            let cuts_before = cache.depth_cuts();
            cache.begin(key.clone());
            match self.build(name, &key, cache).await {
                Ok(resolved) if cache.depth_cuts() > cuts_before => {
                    // Truncated relative to this call's depth; not reusable.
                    cache.abandon(&key);
                    Ok(resolved.map_or(Edge::Missing, Edge::Found))
                }
                Ok(resolved) => {
                    cache.finish(key, resolved.clone());
                    Ok(resolved.map_or(Edge::Missing, Edge::Found))
                }
                Err(err) => {
                    cache.abandon(&key);
                    Err(err)
                }
            }
        }
        .boxed()
    }

    async fn build(
        &self,
        name: &str,
        key: &TypeKey,
        cache: &mut ResolutionCache,
    ) -> Result<Option<Arc<ResolvedClass>>, StoreError> {
        let candidates = self.store.get_by_name(name).await?;
        let Some(decl) = candidates.first().cloned() else {
            debug!(class = name, "no declaration found");
            return Ok(None);
        };
        if candidates.len() > 1 {
            cache
                .diagnostics_mut()
                .ambiguous_declaration(&decl.name, decl.location, candidates.len());
        }

        debug!(class = %decl.name, kind = decl.kind.keyword(), "resolving");
        let mut resolved = ResolvedClass::from_decl(&decl);
        self.resolve_supers(&mut resolved, &decl, key, cache).await?;
        resolved.members = merge_class_members(&resolved, &decl, cache.diagnostics_mut());
        self.run_extensions(&mut resolved, &decl, cache).await;

        debug!(
            class = %resolved.name,
            members = resolved.members.len(),
            interfaces = resolved.interfaces.len(),
            traits = resolved.traits.len(),
            "resolved"
        );
        Ok(Some(Arc::new(resolved)))
    }

    /// Resolve parent, interfaces and traits, in that order.
    async fn resolve_supers(
        &self,
        resolved: &mut ResolvedClass,
        decl: &ClassDecl,
        key: &TypeKey,
        cache: &mut ResolutionCache,
    ) -> Result<(), StoreError> {
        if let Some(parent_name) = &decl.parent_name {
            let edge = self.resolve_edge(parent_name, cache).await?;
            resolved.parent = self.accept_edge(edge, decl, key, cache, "parent class", parent_name);
        }

        let mut interfaces = Vec::new();
        if let Some(parent) = &resolved.parent {
            interfaces.extend(parent.interfaces.iter().cloned());
        }
        for interface_name in &decl.interface_names {
            let edge = self.resolve_edge(interface_name, cache).await?;
            if let Some(interface) = self.accept_edge(edge, decl, key, cache, "interface", interface_name) {
                interfaces.push(interface.clone());
                interfaces.extend(interface.interfaces.iter().cloned());
            }
        }
        resolved.interfaces = dedup_interfaces(interfaces);

        for trait_name in decl.trait_names() {
            let edge = self.resolve_edge(trait_name, cache).await?;
            if let Some(trait_) = self.accept_edge(edge, decl, key, cache, "trait", trait_name) {
                resolved.traits.push(trait_);
            }
        }
        Ok(())
    }

    /// Turn an edge outcome into a supertype, recording why it was dropped.
    ///
    /// An edge that ran back into the type being resolved (`key`) is dropped
    /// even when it produced a type, so no type ends up with itself among its
    /// supertypes.
    fn accept_edge(
        &self,
        edge: Edge,
        decl: &ClassDecl,
        key: &TypeKey,
        cache: &mut ResolutionCache,
        relation: &str,
        target: &str,
    ) -> Option<Arc<ResolvedClass>> {
        let leads_back = cache.take_cycle_hit(key);
        let diagnostics = cache.diagnostics_mut();
        match edge {
            Edge::Found(class) if !leads_back => Some(class),
            Edge::Found(_) | Edge::Cycle => {
                debug!(class = %decl.name, relation, target, "dropping cyclic supertype");
                diagnostics.cyclic_inheritance(&decl.name, decl.location, target);
                None
            }
            Edge::Missing => {
                diagnostics.unknown_type(&decl.name, decl.location, relation, target);
                None
            }
            Edge::TooDeep => {
                diagnostics.depth_limit(&decl.name, self.config.max_depth);
                None
            }
        }
    }

    fn extensions(&self) -> impl Iterator<Item = &dyn ClassResolverExtension> {
        let builtin = self
            .config
            .doc_tags
            .then_some(&self.doc_tags as &dyn ClassResolverExtension);
        builtin
            .into_iter()
            .chain(self.extensions.iter().map(|extension| extension.as_ref()))
    }

    /// Run every extension against `resolved`. A failing extension leaves
    /// the class exactly as it was before that extension ran.
    async fn run_extensions(&self, resolved: &mut ResolvedClass, decl: &ClassDecl, cache: &mut ResolutionCache) {
        for extension in self.extensions() {
            let snapshot = resolved.clone();
            let outcome = AssertUnwindSafe(async { extension.apply(resolved, decl).await })
                .catch_unwind()
                .await;
            let reason = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            warn!(class = %decl.name, extension = extension.name(), %reason, "resolver extension failed");
            *resolved = snapshot;
            cache
                .diagnostics_mut()
                .extension_failed(&decl.name, extension.name(), &reason);
        }
    }
}

/// Keep the first interface of each name.
fn dedup_interfaces(interfaces: Vec<Arc<ResolvedClass>>) -> Vec<Arc<ResolvedClass>> {
    let mut seen = FxHashSet::default();
    interfaces
        .into_iter()
        .filter(|interface| seen.insert(interface.key()))
        .collect()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use crate::hir::{ClassDecl, MemberDecl, MemoryStore};

    fn resolver(decls: impl IntoIterator<Item = ClassDecl>) -> ClassResolver {
        ClassResolver::new(Arc::new(MemoryStore::from_decls(decls)))
    }

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_depth, 64);
        assert!(config.doc_tags);
    }

    #[test]
    fn test_dedup_interfaces_keeps_first() {
        let a = Arc::new(ResolvedClass::from_decl(&ClassDecl::interface("A")));
        let b = Arc::new(ResolvedClass::from_decl(&ClassDecl::interface("B")));
        let a_again = Arc::new(ResolvedClass::from_decl(&ClassDecl::interface("\\a")));
        let deduped = dedup_interfaces(vec![a.clone(), b, a_again]);
        assert_eq!(deduped.len(), 2);
        assert!(Arc::ptr_eq(&deduped[0], &a));
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "panicked");
    }

    #[test]
    fn test_missing_edge_is_cached() {
        let resolver = resolver([ClassDecl::class("A").extends("Gone").implements("Gone")]);
        let mut cache = ResolutionCache::new();
        let a = block_on(resolver.resolve_with_cache("A", &mut cache)).unwrap().unwrap();
        assert!(a.parent.is_none());
        assert!(cache.get("gone").is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.diagnostics().len(), 2);
    }

    #[test]
    fn test_cycle_hit_is_consumed_by_owner() {
        let resolver = resolver([
            ClassDecl::class("A").extends("B").implements("I"),
            ClassDecl::class("B").extends("A"),
            ClassDecl::interface("I").with_member(MemberDecl::method("i")),
        ]);
        let a = block_on(resolver.resolve("A")).unwrap().unwrap();
        assert!(a.parent.is_none());
        // Only the edge that led back is dropped.
        assert_eq!(a.interfaces.len(), 1);
        assert!(a.method("i").is_some());
    }
}
