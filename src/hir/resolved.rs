//! Resolved class-like types: the merged view handed to editor features.
//!
//! A [`ResolvedClass`] is a snapshot. Once the resolver stores it in a
//! [`ResolutionCache`](super::ResolutionCache) it is shared (as a parent,
//! interface or trait of other types) and never mutated again.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{Location, MemberKey, MemberKind, TypeKey, same_type_name};
use super::decl::{ClassDecl, ClassKind, MemberDecl, NameContext, PropertyAccess, Visibility};

// ============================================================================
// RESOLVED MEMBER
// ============================================================================

/// A member as seen from a particular resolved type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMember {
    pub name: SmolStr,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub access: PropertyAccess,
    pub context: NameContext,
    pub location: Option<Location>,
    pub doc_comment: Option<Arc<str>>,
    pub type_hint: Option<SmolStr>,
    pub value: Option<SmolStr>,
    /// Trait and ancestor declarations this member shadows, in merge order.
    pub inherits_from: Vec<Arc<ResolvedMember>>,
}

impl ResolvedMember {
    pub fn from_decl(decl: &MemberDecl) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind,
            visibility: decl.visibility,
            is_static: decl.is_static,
            is_abstract: decl.is_abstract,
            is_final: decl.is_final,
            access: decl.access,
            context: decl.context.clone(),
            location: decl.location,
            doc_comment: decl.doc_comment.clone(),
            type_hint: decl.type_hint.clone(),
            value: decl.value.clone(),
            inherits_from: Vec::new(),
        }
    }

    pub fn key(&self) -> MemberKey {
        MemberKey::new(self.kind, &self.name)
    }

    /// The class-like type whose body (or used trait) declares this member.
    pub fn declaring_class(&self) -> Option<&str> {
        self.context.class.as_deref()
    }

    pub fn is_declared_by(&self, class: &str) -> bool {
        self.declaring_class()
            .is_some_and(|declaring| same_type_name(declaring, class))
    }

    /// Every shadowed declaration, depth-first in merge order.
    pub fn overridden_chain(&self) -> Vec<&ResolvedMember> {
        let mut chain = Vec::new();
        let mut stack: Vec<&ResolvedMember> = self.inherits_from.iter().rev().map(|m| m.as_ref()).collect();
        while let Some(member) = stack.pop() {
            chain.push(member);
            stack.extend(member.inherits_from.iter().rev().map(|m| m.as_ref()));
        }
        chain
    }
}

// ============================================================================
// MEMBER TABLE
// ============================================================================

/// Name-indexed members of a resolved type: one visible entry per key.
///
/// Method keys are case-insensitive, property and constant keys are not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberTable {
    entries: IndexMap<MemberKey, Arc<ResolvedMember>>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MemberKey) -> Option<&Arc<ResolvedMember>> {
        self.entries.get(key)
    }

    pub fn get_kind(&self, kind: MemberKind, name: &str) -> Option<&Arc<ResolvedMember>> {
        self.get(&MemberKey::new(kind, name))
    }

    pub fn method(&self, name: &str) -> Option<&Arc<ResolvedMember>> {
        self.get_kind(MemberKind::Method, name)
    }

    pub fn property(&self, name: &str) -> Option<&Arc<ResolvedMember>> {
        self.get_kind(MemberKind::Property, name)
    }

    pub fn constant(&self, name: &str) -> Option<&Arc<ResolvedMember>> {
        self.get_kind(MemberKind::Const, name)
    }

    pub fn contains(&self, key: &MemberKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Install `member` under its key, returning the entry it replaced.
    pub fn insert(&mut self, member: impl Into<Arc<ResolvedMember>>) -> Option<Arc<ResolvedMember>> {
        let member = member.into();
        self.entries.insert(member.key(), member)
    }

    pub fn remove(&mut self, key: &MemberKey) -> Option<Arc<ResolvedMember>> {
        self.entries.shift_remove(key)
    }

    pub(crate) fn get_mut(&mut self, key: &MemberKey) -> Option<&mut Arc<ResolvedMember>> {
        self.entries.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResolvedMember>> {
        self.entries.values()
    }

    pub fn iter_kind(&self, kind: MemberKind) -> impl Iterator<Item = &Arc<ResolvedMember>> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.kind == kind)
            .map(|(_, member)| member)
    }

    pub fn keys(&self) -> impl Iterator<Item = &MemberKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// RESOLVED CLASS
// ============================================================================

/// Fully merged view of a class, interface or trait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedClass {
    pub name: SmolStr,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub is_final: bool,
    pub context: NameContext,
    pub location: Option<Location>,
    pub doc_comment: Option<Arc<str>>,
    pub parent: Option<Arc<ResolvedClass>>,
    /// Own and inherited interfaces, de-duplicated by name.
    pub interfaces: Vec<Arc<ResolvedClass>>,
    /// Directly used traits, in `use` order.
    pub traits: Vec<Arc<ResolvedClass>>,
    pub members: MemberTable,
}

impl ResolvedClass {
    /// A resolved type with the declaration's details and nothing merged yet.
    pub fn from_decl(decl: &ClassDecl) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind,
            is_abstract: decl.is_abstract,
            is_final: decl.is_final,
            context: decl.context.clone(),
            location: decl.location,
            doc_comment: decl.doc_comment.clone(),
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            members: MemberTable::new(),
        }
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::new(&self.name)
    }

    pub fn is_class(&self) -> bool {
        self.kind == ClassKind::Class
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_trait(&self) -> bool {
        self.kind == ClassKind::Trait
    }

    pub fn method(&self, name: &str) -> Option<&Arc<ResolvedMember>> {
        self.members.method(name)
    }

    pub fn property(&self, name: &str) -> Option<&Arc<ResolvedMember>> {
        self.members.property(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Arc<ResolvedMember>> {
        self.members.constant(name)
    }

    /// Parent, grandparent, ... up the class chain.
    pub fn ancestors(&self) -> impl Iterator<Item = &ResolvedClass> {
        std::iter::successors(self.parent.as_deref(), |class| class.parent.as_deref())
    }

    pub fn interface_names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(|iface| iface.name.as_str())
    }

    /// Whether this type is `name`, extends it, or implements it.
    pub fn is_subtype_of(&self, name: &str) -> bool {
        same_type_name(&self.name, name)
            || self.ancestors().any(|class| same_type_name(&class.name, name))
            || self.interface_names().any(|iface| same_type_name(iface, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(kind: MemberKind, name: &str, class: &str) -> ResolvedMember {
        ResolvedMember::from_decl(
            &MemberDecl::new(kind, name).in_context(NameContext::default().with_class(class)),
        )
    }

    #[test]
    fn test_member_table_case_rules() {
        let mut table = MemberTable::new();
        table.insert(member(MemberKind::Method, "doThing", "A"));
        table.insert(member(MemberKind::Property, "value", "A"));

        assert!(table.method("DOTHING").is_some());
        assert!(table.property("value").is_some());
        assert!(table.property("Value").is_none());
    }

    #[test]
    fn test_iter_kind() {
        let mut table = MemberTable::new();
        table.insert(member(MemberKind::Method, "a", "A"));
        table.insert(member(MemberKind::Const, "B", "A"));
        table.insert(member(MemberKind::Method, "c", "A"));

        let names: Vec<_> = table.iter_kind(MemberKind::Method).map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_is_declared_by_ignores_case_and_leading_separator() {
        let m = member(MemberKind::Method, "run", "App\\Worker");
        assert!(m.is_declared_by("\\app\\worker"));
        assert!(!m.is_declared_by("App\\Other"));
    }

    #[test]
    fn test_overridden_chain_is_depth_first() {
        let grand = Arc::new(member(MemberKind::Method, "f", "G"));
        let mut parent = member(MemberKind::Method, "f", "P");
        parent.inherits_from.push(grand);
        let from_trait = Arc::new(member(MemberKind::Method, "f", "T"));
        let mut child = member(MemberKind::Method, "f", "C");
        child.inherits_from.push(Arc::new(parent));
        child.inherits_from.push(from_trait);

        let chain: Vec<_> = child
            .overridden_chain()
            .into_iter()
            .map(|m| m.declaring_class().unwrap_or_default().to_string())
            .collect();
        assert_eq!(chain, vec!["P", "G", "T"]);
    }

    #[test]
    fn test_ancestors_and_subtype() {
        let base = Arc::new(ResolvedClass::from_decl(&ClassDecl::class("Base")));
        let iface = Arc::new(ResolvedClass::from_decl(&ClassDecl::interface("Countable")));
        let mut mid = ResolvedClass::from_decl(&ClassDecl::class("Mid"));
        mid.parent = Some(base);
        let mut leaf = ResolvedClass::from_decl(&ClassDecl::class("Leaf"));
        leaf.parent = Some(Arc::new(mid));
        leaf.interfaces.push(iface);

        let names: Vec<_> = leaf.ancestors().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mid", "Base"]);
        assert!(leaf.is_subtype_of("base"));
        assert!(leaf.is_subtype_of("\\COUNTABLE"));
        assert!(leaf.is_subtype_of("Leaf"));
        assert!(!leaf.is_subtype_of("Other"));
    }
}
