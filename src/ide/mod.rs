//! Front-end facing layer.
//!
//! Editors, command-line checkers and batch jobs all drive analysis through
//! [`AnalysisHost`]. It owns the project model and the configuration and
//! runs the lex → parse → resolve → analyze pipeline per file.
//!
//! ```ignore
//! use natparse::ide::AnalysisHost;
//! use natparse::project::ProjectLoader;
//!
//! let (project, _report) = ProjectLoader::new().load("path/to/project")?;
//! let host = AnalysisHost::new(project);
//! if let Some(run) = host.analyze_project() {
//!     for diagnostic in run.diagnostics() {
//!         println!("{}: {}", diagnostic.file, diagnostic.message);
//!     }
//! }
//! ```

mod analysis;
mod config;

pub use analysis::{AnalysisError, AnalysisHost, AnalysisRun, FileAnalysis, ProjectAnalysis};
pub use config::{AnalysisConfig, AnalyzersConfig, CompletionConfig, InlayHintsConfig};
