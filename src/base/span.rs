//! Source locations of declarations and members.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

use super::FileId;

/// A byte range inside a particular file.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub file: FileId,
    pub range: TextRange,
}

impl Location {
    #[inline]
    pub fn new(file: FileId, range: TextRange) -> Self {
        Self { file, range }
    }

    /// Location covering `start..end` byte offsets.
    pub fn from_offsets(file: FileId, start: u32, end: u32) -> Self {
        Self {
            file,
            range: TextRange::new(TextSize::from(start), TextSize::from(end.max(start))),
        }
    }

    /// Whether `offset` falls inside this location (end inclusive, so a
    /// cursor sitting right after a name still hits it).
    pub fn contains(&self, file: FileId, offset: TextSize) -> bool {
        self.file == file && self.range.contains_inclusive(offset)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.file, self.range)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}..{}",
            self.file,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}
