//! Data definition modules: the field layout of a database file.
//!
//! A DDM is a fixed-column text listing. [`DdmParser`] reads it through a
//! forward-only [`LinewiseTextScanner`].

mod parser;
mod scanner;

pub use parser::DdmParser;
pub use scanner::LinewiseTextScanner;

use smol_str::SmolStr;
use thiserror::Error;

use crate::syntax::ast::DataFormat;

/// The result of a DDM operation.
pub type DdmResult<T> = Result<T, DdmError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DdmError {
    /// A DDM with no lines at all.
    #[error("a DDM needs at least one line")]
    EmptyInput,

    #[error("line {line}: expected a DDM header starting with 'DB:'")]
    MissingHeader { line: usize },

    #[error("no field table: expected a column header and a separator line")]
    MissingFieldTable,

    #[error("line {line}: {message}")]
    MalformedField { line: usize, message: String },
}

/// Value of the `T` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DdmFieldType {
    Field,
    Group,
    Multiple,
    Periodic,
    Superdescriptor,
    Hyperdescriptor,
    Phonetic,
}

impl DdmFieldType {
    /// Blank means a plain field.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "" => DdmFieldType::Field,
            "G" => DdmFieldType::Group,
            "M" => DdmFieldType::Multiple,
            "P" => DdmFieldType::Periodic,
            "S" => DdmFieldType::Superdescriptor,
            "H" => DdmFieldType::Hyperdescriptor,
            "N" => DdmFieldType::Phonetic,
            _ => return None,
        })
    }

    pub fn code(self) -> char {
        match self {
            DdmFieldType::Field => ' ',
            DdmFieldType::Group => 'G',
            DdmFieldType::Multiple => 'M',
            DdmFieldType::Periodic => 'P',
            DdmFieldType::Superdescriptor => 'S',
            DdmFieldType::Hyperdescriptor => 'H',
            DdmFieldType::Phonetic => 'N',
        }
    }

    /// Groups and periodic groups hold other fields.
    pub fn is_group(self) -> bool {
        matches!(self, DdmFieldType::Group | DdmFieldType::Periodic)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DdmField {
    pub field_type: DdmFieldType,
    pub level: u8,
    /// Two-character database short name.
    pub short_name: SmolStr,
    pub name: SmolStr,
    pub format: Option<DataFormat>,
    /// As written, e.g. `8` or `7.2`.
    pub length: Option<SmolStr>,
    /// `N` for null suppression, `F` for fixed storage.
    pub suppression: Option<char>,
    /// `D` for descriptor, `U` for unique descriptor.
    pub descriptor: Option<char>,
    pub remark: String,
}

impl DdmField {
    pub fn is_descriptor(&self) -> bool {
        self.descriptor.is_some()
            || matches!(
                self.field_type,
                DdmFieldType::Superdescriptor
                    | DdmFieldType::Hyperdescriptor
                    | DdmFieldType::Phonetic
            )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ddm {
    pub name: SmolStr,
    pub database_number: u32,
    pub file_number: u32,
    pub default_sequence: Option<SmolStr>,
    pub fields: Vec<DdmField>,
}

impl Ddm {
    /// Exact, case-sensitive match on the long field name.
    pub fn find_field(&self, name: &str) -> Option<&DdmField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &DdmField> {
        self.fields.iter().filter(|field| field.is_descriptor())
    }
}
