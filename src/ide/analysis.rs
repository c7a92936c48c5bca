//! Analysis host: runs the per-file pipeline over a shared project.
//!
//! The pipeline for one file is lex → parse → resolve → analyze, strictly in
//! that order. A project run first parses every data area (the one point
//! where all files must be known), then analyses the modules in parallel.
//!
//! Starting a project run cancels the previous one. A cancelled run stops
//! handing out work and returns `None`; nobody waits for it.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::config::AnalysisConfig;
use crate::base::{FileId, LineIndex};
use crate::hir::{
    DataAreaDefinition, Diagnostic, ExternalDefinitions, NoExternalDefinitions, ScopeResolver,
    SymbolTable,
};
use crate::lint::{AnalyzerContext, AnalyzerRegistry};
use crate::parser::parse;
use crate::project::loader::read_source;
use crate::project::{Ddm, LibraryId, NaturalFile, NaturalFileType, NaturalProject};
use crate::syntax::ast::{CompilationUnit, DefineData, UnitKind};

const DATA_AREAS: &[NaturalFileType] =
    &[NaturalFileType::Lda, NaturalFileType::Pda, NaturalFileType::Gda];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown file: {0}")]
    UnknownFile(FileId),

    #[error("{0} is not a Natural source unit")]
    NotSource(FileId),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything the pipeline produced for one file.
#[derive(Clone, Debug)]
pub struct FileAnalysis {
    pub file: FileId,
    pub unit: CompilationUnit,
    pub symbols: SymbolTable,
    /// Lexer, parser, resolver and analyzer findings, in that order.
    pub diagnostics: Vec<Diagnostic>,
    pub line_index: LineIndex,
}

#[derive(Debug)]
pub struct ProjectAnalysis {
    pub generation: u64,
    /// In file order.
    pub files: Vec<FileAnalysis>,
    pub failures: Vec<(FileId, AnalysisError)>,
}

impl ProjectAnalysis {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|f| f.diagnostics.iter())
    }
}

/// Handle for one project run.
#[derive(Clone, Debug)]
pub struct AnalysisRun {
    generation: u64,
    token: CancellationToken,
}

impl AnalysisRun {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer run has started.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Default)]
struct RunState {
    generation: u64,
    token: CancellationToken,
}

pub struct AnalysisHost {
    project: Arc<RwLock<NaturalProject>>,
    /// Unsaved editor text, preferred over the file on disk.
    overrides: RwLock<FxHashMap<FileId, Arc<str>>>,
    config: AnalysisConfig,
    registry: Arc<AnalyzerRegistry>,
    runs: Mutex<RunState>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new(NaturalProject::new())
    }
}

impl AnalysisHost {
    pub fn new(project: NaturalProject) -> Self {
        Self {
            project: Arc::new(RwLock::new(project)),
            overrides: RwLock::new(FxHashMap::default()),
            config: AnalysisConfig::default(),
            registry: Arc::new(AnalyzerRegistry::builtin()),
            runs: Mutex::new(RunState::default()),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: AnalyzerRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    /// Shared handle to the project model. Take the write lock only for
    /// ingestion, never while a run is in flight.
    pub fn project(&self) -> Arc<RwLock<NaturalProject>> {
        Arc::clone(&self.project)
    }

    pub fn set_file_text(&self, file: FileId, text: impl Into<Arc<str>>) {
        self.overrides.write().insert(file, text.into());
    }

    pub fn clear_file_text(&self, file: FileId) {
        self.overrides.write().remove(&file);
    }

    fn file_text(&self, file: &NaturalFile) -> Result<Arc<str>, AnalysisError> {
        if let Some(text) = self.overrides.read().get(&file.id) {
            return Ok(Arc::clone(text));
        }
        read_source(&file.path)
            .map(Arc::from)
            .map_err(|source| AnalysisError::Io {
                path: file.path.clone(),
                source,
            })
    }

    fn load_data_area(&self, file: &NaturalFile) -> Result<Arc<DataAreaDefinition>, AnalysisError> {
        let kind = file.file_type.data_area_kind().ok_or(AnalysisError::NotSource(file.id))?;
        let text = self.file_text(file)?;
        let unit = parse(&text, UnitKind::DataArea(kind)).unit;
        let define_data = unit.define_data.unwrap_or(DefineData {
            blocks: Vec::new(),
            range: unit.range,
        });
        Ok(Arc::new(DataAreaDefinition {
            name: file.referable_name.clone(),
            kind,
            define_data,
        }))
    }

    // ------------------------------------------------------------------------
    // Single files
    // ------------------------------------------------------------------------

    /// Analyses text that belongs to no project.
    pub fn analyze_text(&self, text: &str, kind: UnitKind) -> FileAnalysis {
        self.run_pipeline(FileId::DETACHED, text, kind, None, &NoExternalDefinitions)
    }

    /// Analyses one project file. Data areas it uses are parsed on demand.
    pub fn analyze_file(&self, file: FileId) -> Result<FileAnalysis, AnalysisError> {
        let project = self.project.read();
        let natural = project.file(file).ok_or(AnalysisError::UnknownFile(file))?;
        let kind = natural.file_type.unit_kind().ok_or(AnalysisError::NotSource(file))?;
        let text = self.file_text(natural)?;
        let externals = ProjectDefinitions {
            host: self,
            project: &project,
            library: natural.library,
            cache: None,
        };
        Ok(self.run_pipeline(file, &text, kind, Some((&project, natural.library)), &externals))
    }

    fn run_pipeline(
        &self,
        file: FileId,
        text: &str,
        kind: UnitKind,
        project: Option<(&NaturalProject, LibraryId)>,
        externals: &dyn ExternalDefinitions,
    ) -> FileAnalysis {
        let parsed = parse(text, kind);
        let mut diagnostics: Vec<Diagnostic> = parsed
            .lex_errors
            .iter()
            .map(|err| Diagnostic::from_lex_error(file, err))
            .chain(parsed.diagnostics.iter().map(|err| Diagnostic::from_syntax_error(file, err)))
            .collect();

        let mut unit = parsed.unit;
        let resolution = ScopeResolver::new(file, externals).resolve(&mut unit);
        diagnostics.extend(resolution.diagnostics);

        let ctx = AnalyzerContext {
            file,
            source: text,
            unit: &unit,
            symbols: &resolution.symbols,
            project: project.map(|(p, _)| p),
            library: project.map(|(_, l)| l),
            config: &self.config,
            line_index: &parsed.line_index,
        };
        diagnostics.extend(self.registry.run(&ctx));

        tracing::trace!(?file, diagnostics = diagnostics.len(), "analysed file");
        FileAnalysis {
            file,
            unit,
            symbols: resolution.symbols,
            diagnostics,
            line_index: parsed.line_index,
        }
    }

    // ------------------------------------------------------------------------
    // Project runs
    // ------------------------------------------------------------------------

    /// Cancels the current run and starts a new one.
    pub fn start_run(&self) -> AnalysisRun {
        let mut state = self.runs.lock();
        state.token.cancel();
        state.generation += 1;
        state.token = CancellationToken::new();
        AnalysisRun {
            generation: state.generation,
            token: state.token.clone(),
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.runs.lock().generation
    }

    /// Analyses every source unit of the project. `None` when a newer run
    /// superseded this one.
    pub fn analyze_project(&self) -> Option<ProjectAnalysis> {
        let run = self.start_run();
        self.analyze_project_in(&run)
    }

    pub fn analyze_project_in(&self, run: &AnalysisRun) -> Option<ProjectAnalysis> {
        if run.is_cancelled() {
            return None;
        }
        let project = self.project.read();
        tracing::debug!(
            generation = run.generation,
            files = project.files().count(),
            "project run started"
        );

        let data_area_files: Vec<&NaturalFile> =
            project.files().filter(|f| f.is_data_area()).collect();
        let loaded: Vec<(FileId, Result<Arc<DataAreaDefinition>, AnalysisError>)> = data_area_files
            .par_iter()
            .map(|file| (file.id, self.load_data_area(file)))
            .collect();
        let mut failures = Vec::new();
        let mut cache = FxHashMap::default();
        for (id, result) in loaded {
            match result {
                Ok(area) => {
                    cache.insert(id, area);
                }
                Err(err) => failures.push((id, err)),
            }
        }
        if run.is_cancelled() {
            tracing::debug!(generation = run.generation, "project run superseded");
            return None;
        }

        let sources: Vec<(&NaturalFile, UnitKind)> = project
            .files()
            .filter_map(|f| f.file_type.unit_kind().map(|kind| (f, kind)))
            .collect();
        let results: Vec<Option<Result<FileAnalysis, (FileId, AnalysisError)>>> = sources
            .par_iter()
            .map(|&(file, kind)| {
                if run.is_cancelled() {
                    return None;
                }
                let externals = ProjectDefinitions {
                    host: self,
                    project: &project,
                    library: file.library,
                    cache: Some(&cache),
                };
                let scope = Some((&*project, file.library));
                Some(
                    self.file_text(file)
                        .map(|text| self.run_pipeline(file.id, &text, kind, scope, &externals))
                        .map_err(|err| (file.id, err)),
                )
            })
            .collect();
        if run.is_cancelled() {
            tracing::debug!(generation = run.generation, "project run superseded");
            return None;
        }

        let mut files = Vec::with_capacity(results.len());
        for result in results.into_iter().flatten() {
            match result {
                Ok(analysis) => files.push(analysis),
                Err(failure) => failures.push(failure),
            }
        }
        tracing::debug!(
            generation = run.generation,
            files = files.len(),
            failures = failures.len(),
            "project run finished"
        );
        Some(ProjectAnalysis {
            generation: run.generation,
            files,
            failures,
        })
    }
}

/// Data areas and DDMs visible from one library.
struct ProjectDefinitions<'a> {
    host: &'a AnalysisHost,
    project: &'a NaturalProject,
    library: LibraryId,
    /// Pre-parsed data areas of a project run; parsed on demand otherwise.
    cache: Option<&'a FxHashMap<FileId, Arc<DataAreaDefinition>>>,
}

impl ExternalDefinitions for ProjectDefinitions<'_> {
    fn data_area(&self, name: &str) -> Option<Arc<DataAreaDefinition>> {
        let file = self.project.find_module(self.library, name, DATA_AREAS)?;
        match self.cache {
            Some(cache) => cache.get(&file.id).cloned(),
            None => self.host.load_data_area(file).ok(),
        }
    }

    fn ddm(&self, name: &str) -> Option<Arc<Ddm>> {
        self.project.ddm(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::codes;

    fn host() -> (AnalysisHost, FileId, FileId) {
        let mut project = NaturalProject::new();
        let lib = project.add_library("APP", None);
        let lda = project.add_file("/virtual/APP/MYLDA.NSL", "APP/MYLDA.NSL", lib).expect("lda");
        let prog = project.add_file("/virtual/APP/PROG.NSP", "APP/PROG.NSP", lib).expect("prog");
        let host = AnalysisHost::new(project);
        host.set_file_text(lda, "DEFINE DATA LOCAL\n1 #FROM-LDA (A10)\nEND-DEFINE\n");
        host.set_file_text(
            prog,
            "DEFINE DATA LOCAL USING MYLDA\nEND-DEFINE\nWRITE #FROM-LDA #NOPE\nEND\n",
        );
        (host, lda, prog)
    }

    fn codes_of(analysis: &FileAnalysis) -> Vec<&str> {
        analysis.diagnostics.iter().filter_map(|d| d.code.as_deref()).collect()
    }

    #[test]
    fn test_analyze_file_resolves_using() {
        let (host, _, prog) = host();
        let analysis = host.analyze_file(prog).expect("analysed");
        assert_eq!(codes_of(&analysis), [codes::UNDEFINED_REFERENCE]);
        assert!(analysis.diagnostics[0].message.contains("#NOPE"));
    }

    #[test]
    fn test_project_run_matches_single_file() {
        let (host, _, prog) = host();
        let run = host.analyze_project().expect("not superseded");
        assert_eq!(run.generation, 1);
        assert_eq!(run.files.len(), 2);
        assert!(run.failures.is_empty());
        let program = run.files.iter().find(|f| f.file == prog).expect("program analysed");
        assert_eq!(codes_of(program), [codes::UNDEFINED_REFERENCE]);
    }

    #[test]
    fn test_superseded_run_returns_none() {
        let (host, _, _) = host();
        let stale = host.start_run();
        let fresh = host.start_run();
        assert!(stale.is_cancelled());
        assert!(!fresh.is_cancelled());
        assert!(host.analyze_project_in(&stale).is_none());
        assert_eq!(host.analyze_project_in(&fresh).map(|r| r.generation), Some(2));
    }

    #[test]
    fn test_missing_file_on_disk_is_a_failure() {
        let mut project = NaturalProject::new();
        let lib = project.add_library("APP", None);
        let prog = project
            .add_file("/definitely/not/here/PROG.NSP", "APP/PROG.NSP", lib)
            .expect("prog");
        let host = AnalysisHost::new(project);
        assert!(matches!(host.analyze_file(prog), Err(AnalysisError::Io { .. })));
        let run = host.analyze_project().expect("not superseded");
        assert_eq!(run.failures.len(), 1);
    }

    #[test]
    fn test_analyze_text_without_project() {
        let host = AnalysisHost::default();
        let analysis = host.analyze_text("WRITE #X\nEND", UnitKind::Program);
        assert_eq!(analysis.file, FileId::DETACHED);
        assert_eq!(codes_of(&analysis), [codes::UNDEFINED_REFERENCE]);
    }
}
