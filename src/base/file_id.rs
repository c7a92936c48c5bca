//! Identifiers for files known to a Natural project.

use std::fmt;

/// Handle for a [`NaturalFile`](crate::project::NaturalFile) inside a
/// [`NaturalProject`](crate::project::NaturalProject).
///
/// Ids are handed out in discovery order and never reused during a session,
/// so a `FileId` stays valid for as long as the project model lives.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(u32);

impl FileId {
    /// Id used for sources that are not part of any project
    /// (scratch buffers, tests).
    pub const DETACHED: FileId = FileId(u32::MAX);

    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Whether this id refers to a file outside any project.
    #[inline]
    pub const fn is_detached(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            write!(f, "FileId(detached)")
        } else {
            write!(f, "FileId({})", self.0)
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl From<usize> for FileId {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}
