//! Post-merge extension hooks.
//!
//! Hooks run after a type's members are merged, in registration order, and
//! may add or modify members. They see the resolved type and its
//! declaration only; with no access to the resolver they cannot re-enter
//! resolution.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use smol_str::SmolStr;
use thiserror::Error;

use crate::base::MemberKind;
use super::decl::{ClassDecl, NameContext, PropertyAccess, Visibility};
use super::resolved::{ResolvedClass, ResolvedMember};

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A hook that enriches resolved types.
pub trait ClassResolverExtension: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    fn apply<'a>(
        &'a self,
        class: &'a mut ResolvedClass,
        decl: &'a ClassDecl,
    ) -> BoxFuture<'a, Result<(), ExtensionError>>;
}

// ============================================================================
// DOC TAG MEMBERS
// ============================================================================

/// Synthesizes magic members from class doc comment tags:
///
/// ```text
/// /**
///  * @property int $id
///  * @property-read string $name
///  * @method static self create(array $data)
///  */
/// ```
///
/// A synthesized member never hides a member the class declares itself; it
/// does replace an inherited one, recording it as overridden.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocTagExtension;

impl DocTagExtension {
    pub fn new() -> Self {
        Self
    }

    fn synthesize(&self, class: &mut ResolvedClass, decl: &ClassDecl) {
        let Some(doc) = decl.doc_comment.as_deref() else {
            return;
        };
        let context = NameContext::new(decl.context.namespace.clone()).with_class(class.name.clone());

        for tag in parse_doc_tags(doc) {
            let mut member = ResolvedMember {
                name: tag.name,
                kind: tag.kind,
                visibility: Visibility::Public,
                is_static: tag.is_static,
                is_abstract: false,
                is_final: false,
                access: tag.access,
                context: context.clone(),
                location: decl.location,
                doc_comment: tag.description,
                type_hint: tag.type_hint,
                value: None,
                inherits_from: Vec::new(),
            };

            match class.members.get(&member.key()) {
                Some(installed) if installed.is_declared_by(&class.name) => continue,
                Some(inherited) => member.inherits_from.push(inherited.clone()),
                None => {}
            }
            class.members.insert(member);
        }
    }
}

impl ClassResolverExtension for DocTagExtension {
    fn name(&self) -> &str {
        "doc-tags"
    }

    fn apply<'a>(
        &'a self,
        class: &'a mut ResolvedClass,
        decl: &'a ClassDecl,
    ) -> BoxFuture<'a, Result<(), ExtensionError>> {
        self.synthesize(class, decl);
        future::ready(Ok(())).boxed()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DocTag {
    pub kind: MemberKind,
    pub name: SmolStr,
    pub is_static: bool,
    pub access: PropertyAccess,
    pub type_hint: Option<SmolStr>,
    pub description: Option<Arc<str>>,
}

/// Extract `@property*` and `@method` tags. Malformed tags are skipped.
pub(crate) fn parse_doc_tags(doc: &str) -> Vec<DocTag> {
    doc.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches("/**")
                .trim_end_matches("*/")
                .trim_start_matches('*')
                .trim()
        })
        .filter_map(|line| {
            let (tag, rest) = line.split_once(char::is_whitespace)?;
            match tag {
                "@property" => parse_property_tag(rest, PropertyAccess::ReadWrite),
                "@property-read" => parse_property_tag(rest, PropertyAccess::ReadOnly),
                "@property-write" => parse_property_tag(rest, PropertyAccess::WriteOnly),
                "@method" => parse_method_tag(rest),
                _ => None,
            }
        })
        .collect()
}

fn parse_property_tag(rest: &str, access: PropertyAccess) -> Option<DocTag> {
    let mut words = rest.split_whitespace();
    let first = words.next()?;
    let (type_hint, variable) = if first.starts_with('$') {
        (None, first)
    } else {
        (Some(SmolStr::new(first)), words.next()?)
    };
    let name = variable.strip_prefix('$')?;
    if name.is_empty() {
        return None;
    }
    Some(DocTag {
        kind: MemberKind::Property,
        name: SmolStr::new(name),
        is_static: false,
        access,
        type_hint,
        description: description(words),
    })
}

fn parse_method_tag(rest: &str) -> Option<DocTag> {
    let open = rest.find('(')?;
    let close = open + rest[open..].find(')')?;
    let head: Vec<&str> = rest[..open].split_whitespace().collect();
    let (&name, modifiers) = head.split_last()?;
    if name.is_empty() {
        return None;
    }

    let (is_static, type_words) = match modifiers {
        ["static", tail @ ..] => (true, tail),
        _ => (false, modifiers),
    };
    let type_hint = (!type_words.is_empty()).then(|| SmolStr::new(type_words.join(" ")));

    Some(DocTag {
        kind: MemberKind::Method,
        name: SmolStr::new(name),
        is_static,
        access: PropertyAccess::ReadWrite,
        type_hint,
        description: description(rest[close + 1..].split_whitespace()),
    })
}

fn description<'a>(words: impl Iterator<Item = &'a str>) -> Option<Arc<str>> {
    let text = words.collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then(|| Arc::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::decl::MemberDecl;
    use futures::executor::block_on;

    const DOC: &str = "/**
     * A user.
     *
     * @property int $id The key
     * @property-read $name
     * @method static self create(array $data) Factory
     * @method void save()
     * @method broken
     * @property
     */";

    #[test]
    fn test_parse_doc_tags() {
        let tags = parse_doc_tags(DOC);
        assert_eq!(tags.len(), 4);

        assert_eq!(tags[0].name, "id");
        assert_eq!(tags[0].type_hint.as_deref(), Some("int"));
        assert_eq!(tags[0].description.as_deref(), Some("The key"));

        assert_eq!(tags[0].access, PropertyAccess::ReadWrite);

        assert_eq!(tags[1].name, "name");
        assert_eq!(tags[1].type_hint, None);
        assert_eq!(tags[1].access, PropertyAccess::ReadOnly);

        assert_eq!(tags[2].kind, MemberKind::Method);
        assert_eq!(tags[2].name, "create");
        assert!(tags[2].is_static);
        assert_eq!(tags[2].type_hint.as_deref(), Some("self"));
        assert_eq!(tags[2].description.as_deref(), Some("Factory"));

        assert_eq!(tags[3].name, "save");
        assert!(!tags[3].is_static);
    }

    #[test]
    fn test_property_access_tags() {
        let tags = parse_doc_tags("/**\n * @property-read int $id\n * @property-write string $secret\n */");
        assert_eq!(tags.len(), 2);
        assert!(tags[0].access.is_readable() && !tags[0].access.is_writable());
        assert!(!tags[1].access.is_readable() && tags[1].access.is_writable());
    }

    #[test]
    fn test_doc_tags_do_not_hide_own_members() {
        let decl = ClassDecl::class("User")
            .with_doc("/** @property string $id */")
            .with_member(MemberDecl::property("id").with_type("int"));
        let mut class = ResolvedClass::from_decl(&decl);
        for member in &decl.members {
            class.members.insert(ResolvedMember::from_decl(member));
        }

        block_on(DocTagExtension::new().apply(&mut class, &decl)).unwrap();
        assert_eq!(class.property("id").unwrap().type_hint.as_deref(), Some("int"));
    }

    #[test]
    fn test_doc_tags_shadow_inherited_members() {
        let decl = ClassDecl::class("Child").with_doc("/** @method int count() */");
        let inherited = ResolvedMember::from_decl(
            &MemberDecl::method("count").in_context(NameContext::default().with_class("Base")),
        );
        let mut class = ResolvedClass::from_decl(&decl);
        class.members.insert(inherited);

        block_on(DocTagExtension::new().apply(&mut class, &decl)).unwrap();
        let count = class.method("COUNT").unwrap();
        assert!(count.is_declared_by("Child"));
        assert_eq!(count.inherits_from.len(), 1);
        assert!(count.inherits_from[0].is_declared_by("Base"));
    }
}
