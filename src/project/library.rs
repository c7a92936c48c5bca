use std::fmt;
use std::path::PathBuf;

use smol_str::SmolStr;

use crate::base::FileId;

/// Index of a library in its project.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LibraryId(u32);

impl LibraryId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lib#{}", self.0)
    }
}

/// A named group of source files with its steplib chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NaturalLibrary {
    pub id: LibraryId,
    /// Upper-cased.
    pub name: SmolStr,
    pub source_path: Option<PathBuf>,
    /// Libraries searched after this one, in order.
    pub steplibs: Vec<LibraryId>,
    pub files: Vec<FileId>,
}

impl NaturalLibrary {
    pub(crate) fn new(id: LibraryId, name: SmolStr, source_path: Option<PathBuf>) -> Self {
        Self {
            id,
            name,
            source_path,
            steplibs: Vec::new(),
            files: Vec::new(),
        }
    }
}
