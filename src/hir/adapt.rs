//! Trait adaptation: `as` aliases and `insteadof` exclusions.
//!
//! Directives are collected from every `use` statement of the consuming
//! class and applied to each used trait in turn. All aliases run before any
//! exclusion, so an alias can copy a method that is then excluded under its
//! original name.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{MemberKey, MemberKind};
use super::decl::{ClassDecl, TraitAlias, TraitInsteadOf};
use super::diagnostics::DiagnosticCollector;
use super::resolved::{ResolvedClass, ResolvedMember};

/// Adaptation directives of one consuming class, plus bookkeeping of which
/// of them ever matched a method.
pub(crate) struct TraitAdaptations<'a> {
    aliases: Vec<(&'a TraitAlias, bool)>,
    instead_ofs: Vec<(&'a TraitInsteadOf, bool)>,
    /// Traits of the class that actually resolved.
    resolved_traits: Vec<SmolStr>,
}

impl<'a> TraitAdaptations<'a> {
    pub(crate) fn new(decl: &'a ClassDecl) -> Self {
        Self {
            aliases: decl.trait_aliases().map(|a| (a, false)).collect(),
            instead_ofs: decl.trait_instead_ofs().map(|r| (r, false)).collect(),
            resolved_traits: Vec::new(),
        }
    }

    /// The methods `trait_` contributes to the consumer named `consumer`,
    /// with aliases and exclusions applied and the declaring class rewritten
    /// to the consumer.
    pub(crate) fn adapt_methods(
        &mut self,
        trait_: &ResolvedClass,
        consumer: &SmolStr,
    ) -> Vec<Arc<ResolvedMember>> {
        self.resolved_traits.push(trait_.name.clone());

        let mut methods: IndexMap<MemberKey, ResolvedMember> = trait_
            .members
            .iter_kind(MemberKind::Method)
            .map(|m| (m.key(), ResolvedMember::clone(m)))
            .collect();

        for (alias, applied) in &mut self.aliases {
            if !alias.applies_to(&trait_.name) {
                continue;
            }
            let Some(source) = methods.get(&MemberKey::method(&alias.method)) else {
                continue;
            };
            let mut method = source.clone();
            if let Some(new_name) = &alias.new_name {
                method.name = new_name.clone();
            }
            if let Some(visibility) = alias.new_visibility {
                method.visibility = visibility;
            }
            *applied = true;
            methods.insert(method.key(), method);
        }

        for (rule, applied) in &mut self.instead_ofs {
            if rule.excludes(&trait_.name)
                && methods.shift_remove(&MemberKey::method(&rule.method)).is_some()
            {
                *applied = true;
            }
        }

        methods
            .into_values()
            .map(|method| Arc::new(rebind(method, consumer)))
            .collect()
    }

    /// Report directives that never matched a method of a trait that did
    /// resolve. Directives naming unknown traits are left to the unknown
    /// type diagnostics.
    pub(crate) fn report_unmatched(&self, decl: &ClassDecl, diagnostics: &mut DiagnosticCollector) {
        let resolved = |name: &str| {
            self.resolved_traits
                .iter()
                .any(|t| crate::base::same_type_name(t, name))
        };

        for (alias, applied) in &self.aliases {
            if *applied {
                continue;
            }
            let relevant = match &alias.trait_name {
                Some(name) => resolved(name),
                None => !self.resolved_traits.is_empty(),
            };
            if relevant {
                diagnostics.unknown_trait_member(
                    &decl.name,
                    decl.location,
                    alias.trait_name.as_deref(),
                    &alias.method,
                );
            }
        }

        for (rule, applied) in &self.instead_ofs {
            if *applied {
                continue;
            }
            if let Some(loser) = rule.instead_ofs.iter().find(|loser| resolved(loser)) {
                diagnostics.unknown_trait_member(&decl.name, decl.location, Some(loser), &rule.method);
            }
        }
    }
}

/// Trait code is logically copied into the consumer, so the consumer
/// becomes the declaring class.
pub(crate) fn rebind(mut member: ResolvedMember, consumer: &SmolStr) -> ResolvedMember {
    member.context.class = Some(consumer.clone());
    member
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::decl::{MemberDecl, TraitUse, Visibility};

    fn trait_with(name: &str, methods: &[&str]) -> ResolvedClass {
        let mut decl = ClassDecl::trait_(name);
        for method in methods {
            decl = decl.with_member(MemberDecl::method(*method));
        }
        let mut resolved = ResolvedClass::from_decl(&decl);
        for member in &decl.members {
            resolved.members.insert(ResolvedMember::from_decl(member));
        }
        resolved
    }

    fn names(methods: &[Arc<ResolvedMember>]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_plain_use_rebinds_declaring_class() {
        let decl = ClassDecl::class("C").use_trait("T");
        let mut adaptations = TraitAdaptations::new(&decl);
        let methods = adaptations.adapt_methods(&trait_with("T", &["run"]), &decl.name);

        assert_eq!(names(&methods), vec!["run"]);
        assert!(methods[0].is_declared_by("C"));
    }

    #[test]
    fn test_alias_adds_copy_with_visibility() {
        let decl = ClassDecl::class("C").uses(
            TraitUse::new("T").with_alias(
                TraitAlias::new("Run")
                    .of_trait("T")
                    .rename("runAliased")
                    .with_visibility(Visibility::Protected),
            ),
        );
        let mut adaptations = TraitAdaptations::new(&decl);
        let methods = adaptations.adapt_methods(&trait_with("T", &["run"]), &decl.name);

        assert_eq!(names(&methods), vec!["run", "runAliased"]);
        assert_eq!(methods[1].visibility, Visibility::Protected);
        assert_eq!(methods[0].visibility, Visibility::Public);
    }

    #[test]
    fn test_visibility_only_alias_replaces_in_place() {
        let decl = ClassDecl::class("C").uses(
            TraitUse::new("T").with_alias(TraitAlias::new("run").with_visibility(Visibility::Private)),
        );
        let mut adaptations = TraitAdaptations::new(&decl);
        let methods = adaptations.adapt_methods(&trait_with("T", &["run"]), &decl.name);

        assert_eq!(names(&methods), vec!["run"]);
        assert_eq!(methods[0].visibility, Visibility::Private);
    }

    #[test]
    fn test_alias_survives_exclusion() {
        let decl = ClassDecl::class("C")
            .uses(TraitUse::new("T").with_alias(TraitAlias::new("run").of_trait("T").rename("runAliased")))
            .uses(TraitUse::new("U").with_instead_of(TraitInsteadOf::new("U", "run").instead_of("T")));
        let mut adaptations = TraitAdaptations::new(&decl);

        let from_t = adaptations.adapt_methods(&trait_with("T", &["run", "stop"]), &decl.name);
        let from_u = adaptations.adapt_methods(&trait_with("U", &["run"]), &decl.name);

        assert_eq!(names(&from_t), vec!["stop", "runAliased"]);
        assert_eq!(names(&from_u), vec!["run"]);
    }

    #[test]
    fn test_alias_for_other_trait_is_ignored() {
        let decl = ClassDecl::class("C")
            .uses(TraitUse::new("T").with_alias(TraitAlias::new("run").of_trait("U").rename("other")));
        let mut adaptations = TraitAdaptations::new(&decl);
        let methods = adaptations.adapt_methods(&trait_with("T", &["run"]), &decl.name);
        assert_eq!(names(&methods), vec!["run"]);
    }

    #[test]
    fn test_unmatched_directives_are_reported() {
        let decl = ClassDecl::class("C")
            .uses(TraitUse::new("T").with_alias(TraitAlias::new("missing").of_trait("T").rename("x")))
            .uses(TraitUse::new("T").with_instead_of(TraitInsteadOf::new("Z", "gone").instead_of("T")))
            .uses(TraitUse::new("T").with_alias(TraitAlias::new("nowhere").of_trait("Unknown")));
        let mut adaptations = TraitAdaptations::new(&decl);
        adaptations.adapt_methods(&trait_with("T", &["run"]), &decl.name);

        let mut diagnostics = DiagnosticCollector::new();
        adaptations.report_unmatched(&decl, &mut diagnostics);
        assert_eq!(diagnostics.len(), 2);
    }
}
