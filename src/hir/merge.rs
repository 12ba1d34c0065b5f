//! Member merging: own declarations, then traits, then parent, then
//! interfaces, all through one rule.
//!
//! For each incoming candidate under key `k`:
//! - nothing installed under `k`: the candidate becomes the visible member;
//! - the installed member is declared by the type being resolved (own or
//!   trait-contributed): the candidate is appended to its `inherits_from`;
//! - the installed member is itself inherited: the candidate is dropped.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::MemberKind;
use super::adapt::{TraitAdaptations, rebind};
use super::decl::ClassDecl;
use super::diagnostics::DiagnosticCollector;
use super::resolved::{MemberTable, ResolvedClass, ResolvedMember};

/// Compute the member table of `resolved`, whose supertypes are already set.
pub(crate) fn merge_class_members(
    resolved: &ResolvedClass,
    decl: &ClassDecl,
    diagnostics: &mut DiagnosticCollector,
) -> MemberTable {
    let class_name = &resolved.name;
    let mut members = own_members(decl);

    let mut adaptations = TraitAdaptations::new(decl);
    for trait_ in &resolved.traits {
        let properties = trait_
            .members
            .iter_kind(MemberKind::Property)
            .map(|p| Arc::new(rebind(ResolvedMember::clone(p), class_name)));
        merge_members(&mut members, class_name, properties);

        let methods = adaptations.adapt_methods(trait_, class_name);
        merge_members(&mut members, class_name, methods);
    }
    adaptations.report_unmatched(decl, diagnostics);

    if let Some(parent) = &resolved.parent {
        for kind in [MemberKind::Method, MemberKind::Property, MemberKind::Const] {
            merge_inherited(&mut members, class_name, parent.members.iter_kind(kind));
        }
    }

    for interface in &resolved.interfaces {
        for kind in [MemberKind::Method, MemberKind::Const] {
            merge_inherited(&mut members, class_name, interface.members.iter_kind(kind));
        }
    }

    members
}

/// Index the members declared in the type's own body. A later declaration
/// under the same key replaces an earlier one.
pub(crate) fn own_members(decl: &ClassDecl) -> MemberTable {
    let mut table = MemberTable::new();
    for member in &decl.members {
        let mut resolved = ResolvedMember::from_decl(member);
        if resolved.context.class.is_none() {
            resolved.context.class = Some(decl.name.clone());
        }
        table.insert(resolved);
    }
    table
}

/// Merge supertype members; private ones are not inherited.
pub(crate) fn merge_inherited<'m>(
    members: &mut MemberTable,
    class_name: &SmolStr,
    candidates: impl IntoIterator<Item = &'m Arc<ResolvedMember>>,
) {
    let candidates = candidates
        .into_iter()
        .filter(|member| member.visibility.is_inheritable())
        .cloned();
    merge_members(members, class_name, candidates);
}

pub(crate) fn merge_members(
    members: &mut MemberTable,
    class_name: &SmolStr,
    candidates: impl IntoIterator<Item = Arc<ResolvedMember>>,
) {
    for candidate in candidates {
        let key = candidate.key();
        match members.get_mut(&key) {
            None => {
                members.insert(candidate);
            }
            Some(installed) if installed.is_declared_by(class_name) => {
                Arc::make_mut(installed).inherits_from.push(candidate);
            }
            Some(_) => {}
        }
    }
}
