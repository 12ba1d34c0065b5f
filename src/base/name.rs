//! Case-folded keys for class-like and member names.
//!
//! PHP resolves class names and method names case-insensitively, while
//! property and constant names are case-sensitive. These keys encode that
//! rule once so the cache, the store and the member tables agree.

use std::fmt;

use smol_str::SmolStr;

/// Normalized lookup key for a class-like type name.
///
/// A leading namespace separator is stripped (`\Foo\Bar` and `Foo\Bar` name
/// the same type) and ASCII letters are lowercased.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeKey(SmolStr);

impl TypeKey {
    pub fn new(name: &str) -> Self {
        let trimmed = name.strip_prefix('\\').unwrap_or(name);
        Self(SmolStr::new(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `name` normalizes to this key.
    pub fn matches(&self, name: &str) -> bool {
        let trimmed = name.strip_prefix('\\').unwrap_or(name);
        self.0.eq_ignore_ascii_case(trimmed)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Compare two class-like names the way PHP does.
pub fn same_type_name(a: &str, b: &str) -> bool {
    let a = a.strip_prefix('\\').unwrap_or(a);
    let b = b.strip_prefix('\\').unwrap_or(b);
    a.eq_ignore_ascii_case(b)
}

/// The three kinds of class members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberKind {
    Const,
    Property,
    Method,
}

impl MemberKind {
    /// Method names are case-insensitive; everything else is not.
    #[inline]
    pub fn is_case_insensitive(self) -> bool {
        matches!(self, MemberKind::Method)
    }

    pub fn display(self) -> &'static str {
        match self {
            MemberKind::Const => "constant",
            MemberKind::Property => "property",
            MemberKind::Method => "method",
        }
    }
}

/// Key of a member table entry.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemberKey {
    pub kind: MemberKind,
    pub name: SmolStr,
}

impl MemberKey {
    pub fn new(kind: MemberKind, name: &str) -> Self {
        let name = if kind.is_case_insensitive() {
            SmolStr::new(name.to_ascii_lowercase())
        } else {
            SmolStr::new(name)
        };
        Self { kind, name }
    }

    pub fn method(name: &str) -> Self {
        Self::new(MemberKind::Method, name)
    }

    pub fn property(name: &str) -> Self {
        Self::new(MemberKind::Property, name)
    }

    pub fn constant(name: &str) -> Self {
        Self::new(MemberKind::Const, name)
    }
}
