//! Diagnostics: degraded-resolution reporting.
//!
//! Resolution is best-effort and never fails on bad input, but each place
//! where it had to degrade (unknown supertype, inheritance cycle, dangling
//! trait adaptation, failing extension) is recorded here so callers can
//! surface it.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::Location;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A note about how the resolution of `class` was degraded.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The class-like type being resolved when this was recorded.
    pub class: SmolStr,
    /// Declaration of `class`, when known.
    pub location: Option<Location>,
    pub severity: Severity,
    pub code: &'static str,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn new(
        class: impl Into<SmolStr>,
        severity: Severity,
        code: &'static str,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            class: class.into(),
            location: None,
            severity,
            code,
            message: message.into(),
        }
    }

    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes recorded by the resolver.
pub mod codes {
    /// Supertype name with no declaration.
    pub const UNKNOWN_TYPE: &str = "R0001";
    /// Supertype edge that leads back into a type being resolved.
    pub const CYCLIC_INHERITANCE: &str = "R0002";
    /// Trait alias or insteadof naming a method the trait does not have.
    pub const UNKNOWN_TRAIT_MEMBER: &str = "R0003";
    /// Resolver extension returned an error or panicked.
    pub const EXTENSION_FAILED: &str = "R0004";
    /// Supertype chain deeper than the configured limit.
    pub const DEPTH_LIMIT: &str = "R0005";

    /// More than one declaration for a name; the first was used.
    pub const AMBIGUOUS_DECLARATION: &str = "I0001";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during one resolution request.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn unknown_type(&mut self, class: &str, location: Option<Location>, relation: &str, name: &str) {
        self.add(
            Diagnostic::new(
                class,
                Severity::Warning,
                codes::UNKNOWN_TYPE,
                format!("unknown {}: '{}'", relation, name),
            )
            .at(location),
        );
    }

    pub fn cyclic_inheritance(&mut self, class: &str, location: Option<Location>, name: &str) {
        self.add(
            Diagnostic::new(
                class,
                Severity::Error,
                codes::CYCLIC_INHERITANCE,
                format!("cyclic inheritance: '{}' is already being resolved", name),
            )
            .at(location),
        );
    }

    pub fn unknown_trait_member(
        &mut self,
        class: &str,
        location: Option<Location>,
        trait_name: Option<&str>,
        method: &str,
    ) {
        let message = match trait_name {
            Some(trait_name) => format!("trait '{}' has no method '{}'", trait_name, method),
            None => format!("no used trait has a method '{}'", method),
        };
        self.add(
            Diagnostic::new(class, Severity::Warning, codes::UNKNOWN_TRAIT_MEMBER, message)
                .at(location),
        );
    }

    pub fn extension_failed(&mut self, class: &str, extension: &str, reason: &str) {
        self.add(Diagnostic::new(
            class,
            Severity::Warning,
            codes::EXTENSION_FAILED,
            format!("extension '{}' failed: {}", extension, reason),
        ));
    }

    pub fn depth_limit(&mut self, class: &str, limit: usize) {
        self.add(Diagnostic::new(
            class,
            Severity::Warning,
            codes::DEPTH_LIMIT,
            format!("supertype chain deeper than {} levels", limit),
        ));
    }

    pub fn ambiguous_declaration(&mut self, class: &str, location: Option<Location>, candidates: usize) {
        self.add(
            Diagnostic::new(
                class,
                Severity::Info,
                codes::AMBIGUOUS_DECLARATION,
                format!("{} declarations found for '{}'; using the first", candidates, class),
            )
            .at(location),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics recorded while resolving a particular class.
    pub fn diagnostics_for_class(&self, class: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| crate::base::same_type_name(&d.class, class))
            .collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_to_lsp() {
        assert_eq!(Severity::Error.to_lsp(), 1);
        assert_eq!(Severity::Hint.to_lsp(), 4);
    }

    #[test]
    fn test_collector_by_class() {
        let mut collector = DiagnosticCollector::new();
        collector.unknown_type("App\\A", None, "parent class", "Missing");
        collector.cyclic_inheritance("App\\B", None, "App\\A");

        assert_eq!(collector.len(), 2);
        assert_eq!(collector.diagnostics_for_class("app\\a").len(), 1);
        assert!(collector.has_code(codes::CYCLIC_INHERITANCE));
        assert!(!collector.has_code(codes::DEPTH_LIMIT));
    }

    #[test]
    fn test_unknown_trait_member_messages() {
        let mut collector = DiagnosticCollector::new();
        collector.unknown_trait_member("K", None, Some("T"), "run");
        collector.unknown_trait_member("K", None, None, "walk");

        let messages: Vec<_> = collector.diagnostics().iter().map(|d| d.message.as_ref()).collect();
        assert_eq!(messages, vec!["trait 'T' has no method 'run'", "no used trait has a method 'walk'"]);
    }
}
