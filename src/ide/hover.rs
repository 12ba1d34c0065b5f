//! Hover: one-line member signatures.

use crate::base::MemberKind;
use crate::hir::{PropertyAccess, ResolvedMember, Visibility};

/// Signature header for a member, e.g. `public static function make(): self`,
/// `protected int $count` or `const LIMIT = 10`.
pub fn member_signature(member: &ResolvedMember) -> String {
    let mut s = String::new();
    match member.kind {
        MemberKind::Const => {
            // Public is implied for constants.
            if member.visibility != Visibility::Public {
                s.push_str(member.visibility.keyword());
                s.push(' ');
            }
            s.push_str("const ");
            s.push_str(&member.name);
            if let Some(value) = &member.value {
                s.push_str(" = ");
                s.push_str(value);
            }
        }
        MemberKind::Property => {
            push_modifiers(&mut s, member);
            if member.access == PropertyAccess::ReadOnly {
                s.push_str("readonly ");
            }
            if let Some(type_hint) = &member.type_hint {
                s.push_str(type_hint);
                s.push(' ');
            }
            s.push('$');
            s.push_str(&member.name);
        }
        MemberKind::Method => {
            if member.is_abstract {
                s.push_str("abstract ");
            }
            if member.is_final {
                s.push_str("final ");
            }
            push_modifiers(&mut s, member);
            s.push_str("function ");
            s.push_str(&member.name);
            s.push_str("()");
            if let Some(type_hint) = &member.type_hint {
                s.push_str(": ");
                s.push_str(type_hint);
            }
        }
    }
    s
}

fn push_modifiers(s: &mut String, member: &ResolvedMember) {
    s.push_str(member.visibility.keyword());
    s.push(' ');
    if member.is_static {
        s.push_str("static ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::MemberDecl;

    fn signature(decl: MemberDecl) -> String {
        member_signature(&ResolvedMember::from_decl(&decl))
    }

    #[test]
    fn test_method_signature() {
        assert_eq!(
            signature(MemberDecl::method("make").with_static().with_type("self")),
            "public static function make(): self"
        );
        assert_eq!(
            signature(MemberDecl::method("run").protected().with_abstract()),
            "abstract protected function run()"
        );
    }

    #[test]
    fn test_property_signature() {
        assert_eq!(signature(MemberDecl::property("count").protected().with_type("int")), "protected int $count");
        assert_eq!(signature(MemberDecl::property("id").readonly().with_type("int")), "public readonly int $id");
    }

    #[test]
    fn test_const_signature() {
        assert_eq!(signature(MemberDecl::constant("LIMIT").with_value("10")), "const LIMIT = 10");
        assert_eq!(signature(MemberDecl::constant("SECRET").private()), "private const SECRET");
    }
}
