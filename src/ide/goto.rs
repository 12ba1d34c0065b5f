//! Go to overridden member: walking a member's override chain.

use smol_str::SmolStr;

use crate::base::{Location, MemberKind};
use crate::hir::ResolvedClass;

/// A declaration the visible member shadows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideTarget {
    /// Declaring class-like type of the shadowed member.
    pub class: Option<SmolStr>,
    pub name: SmolStr,
    pub location: Option<Location>,
}

/// Declarations shadowed by `class`'s visible member `kind`/`name`, nearest
/// first. Empty when the member is unknown or overrides nothing.
pub fn overridden_members(class: &ResolvedClass, kind: MemberKind, name: &str) -> Vec<OverrideTarget> {
    let Some(member) = class.members.get_kind(kind, name) else {
        return Vec::new();
    };
    member
        .overridden_chain()
        .into_iter()
        .map(|shadowed| OverrideTarget {
            class: shadowed.context.class.clone(),
            name: shadowed.name.clone(),
            location: shadowed.location,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::hir::{ClassDecl, MemberDecl, NameContext, ResolvedMember};

    #[test]
    fn test_overridden_members() {
        let parent = ResolvedMember::from_decl(
            &MemberDecl::method("render").in_context(NameContext::default().with_class("View")),
        );
        let mut own = ResolvedMember::from_decl(
            &MemberDecl::method("render").in_context(NameContext::default().with_class("Page")),
        );
        own.inherits_from.push(Arc::new(parent));

        let mut class = ResolvedClass::from_decl(&ClassDecl::class("Page"));
        class.members.insert(own);

        let targets = overridden_members(&class, MemberKind::Method, "RENDER");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].class.as_deref(), Some("View"));
        assert!(overridden_members(&class, MemberKind::Method, "missing").is_empty());
    }
}
