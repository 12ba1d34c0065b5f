//! Raw declarations of class-like types, as produced by the parser.
//!
//! These are the *unresolved* inputs of the reflection engine: each one
//! describes a single `class`, `interface` or `trait` exactly as written in
//! its file, with supertypes referenced by name only.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{Location, MemberKind, same_type_name};

/// Member visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    /// Private members are never inherited by subclasses.
    #[inline]
    pub fn is_inheritable(self) -> bool {
        self != Visibility::Private
    }
}

/// Whether a property can be read, written, or both.
///
/// Declared `readonly` properties and `@property-read` tags are read-only;
/// `@property-write` tags are write-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyAccess {
    #[default]
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

impl PropertyAccess {
    pub fn is_readable(self) -> bool {
        self != PropertyAccess::WriteOnly
    }

    pub fn is_writable(self) -> bool {
        self != PropertyAccess::ReadOnly
    }
}

/// What kind of class-like a declaration is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
        }
    }
}

/// Where a declaration was written: its namespace and, for members, the
/// class-like type that declares it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameContext {
    pub namespace: SmolStr,
    pub class: Option<SmolStr>,
}

impl NameContext {
    pub fn new(namespace: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<SmolStr>) -> Self {
        self.class = Some(class.into());
        self
    }
}

/// A method, property or class constant as declared.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberDecl {
    pub name: SmolStr,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Always `ReadWrite` for methods and constants.
    pub access: PropertyAccess,
    pub context: NameContext,
    pub location: Option<Location>,
    pub doc_comment: Option<Arc<str>>,
    /// Declared type (return type for methods).
    pub type_hint: Option<SmolStr>,
    /// Constant value or property default, as source text.
    pub value: Option<SmolStr>,
}

impl MemberDecl {
    pub fn new(kind: MemberKind, name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_final: false,
            access: PropertyAccess::ReadWrite,
            context: NameContext::default(),
            location: None,
            doc_comment: None,
            type_hint: None,
            value: None,
        }
    }

    pub fn method(name: impl Into<SmolStr>) -> Self {
        Self::new(MemberKind::Method, name)
    }

    pub fn property(name: impl Into<SmolStr>) -> Self {
        Self::new(MemberKind::Property, name)
    }

    pub fn constant(name: impl Into<SmolStr>) -> Self {
        Self::new(MemberKind::Const, name)
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn protected(self) -> Self {
        self.with_visibility(Visibility::Protected)
    }

    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_access(mut self, access: PropertyAccess) -> Self {
        self.access = access;
        self
    }

    pub fn readonly(self) -> Self {
        self.with_access(PropertyAccess::ReadOnly)
    }

    pub fn with_type(mut self, type_hint: impl Into<SmolStr>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<SmolStr>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn in_context(mut self, context: NameContext) -> Self {
        self.context = context;
        self
    }
}

/// `use T { T::foo as bar; }` style alias.
///
/// `trait_name == None` means the alias applies to whichever used trait
/// provides `method`. Without `new_name` the alias only changes visibility.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitAlias {
    pub trait_name: Option<SmolStr>,
    pub method: SmolStr,
    pub new_name: Option<SmolStr>,
    pub new_visibility: Option<Visibility>,
}

impl TraitAlias {
    pub fn new(method: impl Into<SmolStr>) -> Self {
        Self {
            trait_name: None,
            method: method.into(),
            new_name: None,
            new_visibility: None,
        }
    }

    pub fn of_trait(mut self, trait_name: impl Into<SmolStr>) -> Self {
        self.trait_name = Some(trait_name.into());
        self
    }

    pub fn rename(mut self, new_name: impl Into<SmolStr>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.new_visibility = Some(visibility);
        self
    }

    /// Whether this alias targets the trait called `trait_name`.
    pub fn applies_to(&self, trait_name: &str) -> bool {
        self.trait_name
            .as_deref()
            .is_none_or(|name| same_type_name(name, trait_name))
    }
}

/// `use A, B { A::foo insteadof B; }` conflict resolution: `method` of the
/// traits in `instead_ofs` is excluded in favour of `trait_name`'s.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitInsteadOf {
    pub trait_name: Option<SmolStr>,
    pub method: SmolStr,
    pub instead_ofs: Vec<SmolStr>,
}

impl TraitInsteadOf {
    pub fn new(winner: impl Into<SmolStr>, method: impl Into<SmolStr>) -> Self {
        Self {
            trait_name: Some(winner.into()),
            method: method.into(),
            instead_ofs: Vec::new(),
        }
    }

    pub fn instead_of(mut self, loser: impl Into<SmolStr>) -> Self {
        self.instead_ofs.push(loser.into());
        self
    }

    /// Whether `trait_name` loses `method` to another trait.
    pub fn excludes(&self, trait_name: &str) -> bool {
        self.instead_ofs
            .iter()
            .any(|loser| same_type_name(loser, trait_name))
    }
}

/// One used trait together with the adaptation directives written next to it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitUse {
    pub trait_name: SmolStr,
    pub aliases: Vec<TraitAlias>,
    pub instead_ofs: Vec<TraitInsteadOf>,
}

impl TraitUse {
    pub fn new(trait_name: impl Into<SmolStr>) -> Self {
        Self {
            trait_name: trait_name.into(),
            aliases: Vec::new(),
            instead_ofs: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: TraitAlias) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn with_instead_of(mut self, instead_of: TraitInsteadOf) -> Self {
        self.instead_ofs.push(instead_of);
        self
    }
}

/// A single class, interface or trait declaration.
///
/// For interfaces, `interface_names` holds the `extends` list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDecl {
    pub name: SmolStr,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub is_final: bool,
    pub parent_name: Option<SmolStr>,
    pub interface_names: Vec<SmolStr>,
    pub trait_uses: Vec<TraitUse>,
    pub members: Vec<MemberDecl>,
    pub context: NameContext,
    pub location: Option<Location>,
    pub doc_comment: Option<Arc<str>>,
}

impl ClassDecl {
    pub fn new(kind: ClassKind, name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn class(name: impl Into<SmolStr>) -> Self {
        Self::new(ClassKind::Class, name)
    }

    pub fn interface(name: impl Into<SmolStr>) -> Self {
        Self::new(ClassKind::Interface, name)
    }

    pub fn trait_(name: impl Into<SmolStr>) -> Self {
        Self::new(ClassKind::Trait, name)
    }

    pub fn extends(mut self, parent: impl Into<SmolStr>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<SmolStr>) -> Self {
        self.interface_names.push(interface.into());
        self
    }

    pub fn uses(mut self, trait_use: TraitUse) -> Self {
        self.trait_uses.push(trait_use);
        self
    }

    pub fn use_trait(self, trait_name: impl Into<SmolStr>) -> Self {
        self.uses(TraitUse::new(trait_name))
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn in_namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.context.namespace = namespace.into();
        for member in &mut self.members {
            member.context.namespace = self.context.namespace.clone();
        }
        self
    }

    /// Add a member declared in this type's body. A member without a
    /// declaring class gets this type as its context.
    pub fn with_member(mut self, mut member: MemberDecl) -> Self {
        if member.context.class.is_none() {
            member.context = self.context.clone().with_class(self.name.clone());
        }
        self.members.push(member);
        self
    }

    pub fn methods(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members_of(MemberKind::Method)
    }

    pub fn properties(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members_of(MemberKind::Property)
    }

    pub fn consts(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members_of(MemberKind::Const)
    }

    pub fn members_of(&self, kind: MemberKind) -> impl Iterator<Item = &MemberDecl> {
        self.members.iter().filter(move |m| m.kind == kind)
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.trait_uses.iter().map(|u| &u.trait_name)
    }

    /// All alias directives of the class, across every `use` statement.
    pub fn trait_aliases(&self) -> impl Iterator<Item = &TraitAlias> {
        self.trait_uses.iter().flat_map(|u| u.aliases.iter())
    }

    /// All `insteadof` directives of the class, across every `use` statement.
    pub fn trait_instead_ofs(&self) -> impl Iterator<Item = &TraitInsteadOf> {
        self.trait_uses.iter().flat_map(|u| u.instead_ofs.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_member_sets_declaring_class() {
        let decl = ClassDecl::class("Foo")
            .in_namespace("App")
            .with_member(MemberDecl::method("bar"));
        let bar = decl.methods().next().unwrap();
        assert_eq!(bar.context.class.as_deref(), Some("Foo"));
        assert_eq!(bar.context.namespace, "App");
    }

    #[test]
    fn test_with_member_keeps_explicit_context() {
        let ctx = NameContext::new("Lib").with_class("Other");
        let decl = ClassDecl::class("Foo").with_member(MemberDecl::property("x").in_context(ctx.clone()));
        assert_eq!(decl.properties().next().unwrap().context, ctx);
    }

    #[test]
    fn test_members_by_kind() {
        let decl = ClassDecl::class("Foo")
            .with_member(MemberDecl::method("a"))
            .with_member(MemberDecl::property("b"))
            .with_member(MemberDecl::constant("C"))
            .with_member(MemberDecl::method("d"));
        assert_eq!(decl.methods().count(), 2);
        assert_eq!(decl.properties().count(), 1);
        assert_eq!(decl.consts().count(), 1);
    }

    #[test]
    fn test_alias_applies_to() {
        let any = TraitAlias::new("run");
        let named = TraitAlias::new("run").of_trait("\\App\\Runs");
        assert!(any.applies_to("Whatever"));
        assert!(named.applies_to("app\\runs"));
        assert!(!named.applies_to("App\\Walks"));
    }

    #[test]
    fn test_instead_of_excludes() {
        let rule = TraitInsteadOf::new("A", "hello").instead_of("B").instead_of("C");
        assert!(rule.excludes("b"));
        assert!(rule.excludes("C"));
        assert!(!rule.excludes("A"));
    }

    #[test]
    fn test_adaptations_flatten_across_uses() {
        let decl = ClassDecl::class("K")
            .uses(TraitUse::new("A").with_alias(TraitAlias::new("x").rename("y")))
            .uses(TraitUse::new("B").with_instead_of(TraitInsteadOf::new("B", "z").instead_of("A")));
        assert_eq!(decl.trait_names().count(), 2);
        assert_eq!(decl.trait_aliases().count(), 1);
        assert_eq!(decl.trait_instead_ofs().count(), 1);
    }
}
