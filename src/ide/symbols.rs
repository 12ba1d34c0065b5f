//! Member symbols: the outline of a resolved class.

use smol_str::SmolStr;

use crate::base::{Location, MemberKind};
use crate::hir::{ResolvedClass, Visibility};

/// One entry of a class outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSymbol {
    pub name: SmolStr,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub is_static: bool,
    /// The class-like type declaring the member.
    pub container: Option<SmolStr>,
    pub location: Option<Location>,
}

/// Every visible member of `class`: constants, then properties, then
/// methods, each group sorted by name.
pub fn member_symbols(class: &ResolvedClass) -> Vec<MemberSymbol> {
    let mut symbols: Vec<MemberSymbol> = class
        .members
        .iter()
        .map(|member| MemberSymbol {
            name: member.name.clone(),
            kind: member.kind,
            visibility: member.visibility,
            is_static: member.is_static,
            container: member.context.class.clone(),
            location: member.location,
        })
        .collect();

    symbols.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    symbols
}
