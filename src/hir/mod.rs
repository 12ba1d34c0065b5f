//! High-level IR: class-like declarations and their resolved form.
//!
//! ```text
//! DeclarationStore ──► ClassResolver ──► ResolvedClass
//!                        │  ResolutionCache (per request, cycle guard)
//!                        │  merge / adapt   (members, traits)
//!                        └─ extensions      (post-merge hooks)
//! ```

mod adapt;
mod cache;
mod decl;
mod diagnostics;
mod extension;
mod merge;
mod resolve;
mod resolved;
mod store;

pub use cache::ResolutionCache;
pub use decl::{
    ClassDecl, ClassKind, MemberDecl, NameContext, PropertyAccess, TraitAlias, TraitInsteadOf, TraitUse,
    Visibility,
};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use extension::{ClassResolverExtension, DocTagExtension, ExtensionError};
pub use resolve::{ClassResolver, ResolverConfig};
pub use resolved::{MemberTable, ResolvedClass, ResolvedMember};
pub use store::{DeclarationStore, MemoryStore, StoreError};

pub use crate::base::MemberKind;
