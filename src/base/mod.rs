//! Foundation types shared by the reflection engine:
//! - [`FileId`] - source file handles
//! - [`Location`], [`TextRange`], [`TextSize`] - source positions
//! - [`TypeKey`], [`MemberKey`] - case-folded name keys
//!
//! This module has NO dependencies on other crate modules.

mod file_id;
mod name;
mod span;

pub use file_id::FileId;
pub use name::{MemberKey, MemberKind, TypeKey, same_type_name};
pub use span::{Location, TextRange, TextSize};

pub use text_size;
