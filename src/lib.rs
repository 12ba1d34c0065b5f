//! # php-reflection
//!
//! Class reflection resolution for a PHP language server: turns raw,
//! per-file class/interface/trait declarations into resolved types with
//! flattened supertypes, merged members and override chains.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide   → editor-facing views (symbols, overrides, signatures)
//!   ↓
//! hir   → declarations, store, resolver, extensions, diagnostics
//!   ↓
//! base  → primitives (FileId, Location, case-folded name keys)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use reflection::hir::{ClassDecl, ClassResolver, MemberDecl, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::from_decls([
//!     ClassDecl::class("Base").with_member(MemberDecl::method("run")),
//!     ClassDecl::class("Child").extends("Base"),
//! ]));
//! let resolver = ClassResolver::new(store);
//! let child = resolver.resolve("Child").await?.expect("declared");
//! assert!(child.method("RUN").is_some());
//! ```

/// Foundation types: FileId, Location, name keys
pub mod base;

/// Declarations and the resolution engine
pub mod hir;

/// IDE features over resolved classes
pub mod ide;

pub use base::{FileId, Location, MemberKey, MemberKind, TextRange, TextSize, TypeKey};
pub use hir::{ClassResolver, ResolutionCache, ResolvedClass, ResolvedMember};
