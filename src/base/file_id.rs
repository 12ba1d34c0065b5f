//! Handles for the source files declarations come from.

use std::fmt;

/// Identifies one source file known to a declaration store.
///
/// Replacing the declarations of a file (after an edit) is keyed by this
/// handle, so it must stay stable for the lifetime of the store.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_display() {
        assert_eq!(FileId::new(7).to_string(), "file#7");
        assert_eq!(format!("{:?}", FileId::new(7)), "FileId(7)");
    }

    #[test]
    fn test_file_id_ordering() {
        let mut ids = vec![FileId::new(3), FileId::new(1), FileId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![FileId::new(1), FileId::new(2), FileId::new(3)]);
    }
}
