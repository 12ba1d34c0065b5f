//! IDE features: editor-facing views over resolved classes.
//!
//! These are pure functions over [`ResolvedClass`](crate::hir::ResolvedClass)
//! values; they contain no resolution logic of their own. Callers resolve
//! the class first (one [`ClassResolver`](crate::hir::ClassResolver) call
//! per request) and then query it here.

mod goto;
mod hover;
mod symbols;

pub use goto::{OverrideTarget, overridden_members};
pub use hover::member_signature;
pub use symbols::{MemberSymbol, member_symbols};
