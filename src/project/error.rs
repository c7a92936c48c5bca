use std::path::PathBuf;

use thiserror::Error;

use super::build_file::BuildFileParserError;
use super::ddm::DdmError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a project-model operation.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// An error raised while building or loading the project model.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A build file could not be ingested.
    #[error(transparent)]
    BuildFile(#[from] BuildFileParserError),

    /// A DDM file could not be parsed.
    #[error("ddm error: {0}")]
    Ddm(#[from] DdmError),

    /// An error while walking the project directory.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A file with this project-relative path is already registered.
    #[error("duplicate file: {0}")]
    DuplicateFile(String),

    /// The path does not carry a Natural source extension.
    #[error("not a Natural source file: {}", .0.display())]
    UnsupportedFile(PathBuf),

    /// No library with this id or name.
    #[error("unknown library: {0}")]
    UnknownLibrary(String),

    /// The project root does not exist or is not a directory.
    #[error("project root not found: {}", .0.display())]
    RootNotFound(PathBuf),
}
