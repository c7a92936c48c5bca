//! Source files known to the project model.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use super::library::LibraryId;
use crate::base::FileId;
use crate::syntax::ast::{DataAreaKind, UnitKind};

/// Object type of a Natural source file, from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NaturalFileType {
    Program,
    Subprogram,
    Subroutine,
    Copycode,
    Helproutine,
    Map,
    Function,
    Lda,
    Pda,
    Gda,
    Ddm,
}

impl NaturalFileType {
    pub const ALL: [NaturalFileType; 11] = [
        NaturalFileType::Program,
        NaturalFileType::Subprogram,
        NaturalFileType::Subroutine,
        NaturalFileType::Copycode,
        NaturalFileType::Helproutine,
        NaturalFileType::Map,
        NaturalFileType::Function,
        NaturalFileType::Lda,
        NaturalFileType::Pda,
        NaturalFileType::Gda,
        NaturalFileType::Ddm,
    ];

    /// Upper-case extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            NaturalFileType::Program => "NSP",
            NaturalFileType::Subprogram => "NSN",
            NaturalFileType::Subroutine => "NSS",
            NaturalFileType::Copycode => "NSC",
            NaturalFileType::Helproutine => "NSH",
            NaturalFileType::Map => "NSM",
            NaturalFileType::Function => "NS7",
            NaturalFileType::Lda => "NSL",
            NaturalFileType::Pda => "NSA",
            NaturalFileType::Gda => "NSG",
            NaturalFileType::Ddm => "NSD",
        }
    }

    /// Case-insensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.extension().eq_ignore_ascii_case(extension))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// How the parser treats files of this type; DDMs are not Natural source.
    pub fn unit_kind(self) -> Option<UnitKind> {
        Some(match self {
            NaturalFileType::Program => UnitKind::Program,
            NaturalFileType::Subprogram => UnitKind::Subprogram,
            NaturalFileType::Subroutine => UnitKind::Subroutine,
            NaturalFileType::Copycode => UnitKind::Copycode,
            NaturalFileType::Helproutine => UnitKind::Helproutine,
            NaturalFileType::Map => UnitKind::Map,
            NaturalFileType::Function => UnitKind::Function,
            NaturalFileType::Lda => UnitKind::DataArea(DataAreaKind::Local),
            NaturalFileType::Pda => UnitKind::DataArea(DataAreaKind::Parameter),
            NaturalFileType::Gda => UnitKind::DataArea(DataAreaKind::Global),
            NaturalFileType::Ddm => return None,
        })
    }

    pub fn data_area_kind(self) -> Option<DataAreaKind> {
        match self.unit_kind() {
            Some(UnitKind::DataArea(kind)) => Some(kind),
            _ => None,
        }
    }
}

/// One file in the project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NaturalFile {
    pub id: FileId,
    /// Absolute path.
    pub path: PathBuf,
    /// Project-relative path with `/` separators; unique within the project.
    pub relative_path: String,
    /// Upper-cased module name used by CALLNAT, FETCH, USING and friends.
    pub referable_name: SmolStr,
    pub file_type: NaturalFileType,
    pub library: LibraryId,
}

impl NaturalFile {
    pub fn is_data_area(&self) -> bool {
        self.file_type.data_area_kind().is_some()
    }
}

/// Normalises a project-relative path: `/` separators and no leading `./`.
pub fn normalize_relative_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let mut rest = path.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}

/// The module name a file is referred to by: its upper-cased stem.
pub fn referable_name(path: &Path) -> SmolStr {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    SmolStr::new(stem.to_ascii_uppercase())
}
