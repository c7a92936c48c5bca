//! Project model: libraries, files, DDMs and their ingestion.

pub mod build_file;
pub mod ddm;
mod error;
pub mod file;
pub mod git_status;
pub mod library;
pub mod loader;
mod model;

pub use build_file::{BuildFileCause, BuildFileParser, BuildFileParserError, XmlNaturalLibrary};
pub use ddm::{Ddm, DdmError, DdmField, DdmFieldType, DdmParser, LinewiseTextScanner};
pub use error::{ProjectError, ProjectResult};
pub use file::{NaturalFile, NaturalFileType};
pub use git_status::{FilePredicate, parse_status_to_predicates, select_files};
pub use library::{LibraryId, NaturalLibrary};
pub use loader::{LoadFailure, LoadReport, ProjectLoader};
pub use model::NaturalProject;
