//! Analyzers: checks that run over a resolved compilation unit.
//!
//! An [`Analyzer`] names the [`NodeKind`]s it wants to see. The
//! [`AnalyzerRegistry`] walks each file once and hands every node to the
//! analyzers interested in its kind. Analyzers only read the tree and only
//! produce diagnostics.
//!
//! # Adding an Analyzer
//!
//! 1. Create `src/lint/<your_analyzer>.rs` with a unit struct implementing
//!    [`Analyzer`].
//! 2. Add `mod your_analyzer;` below (alphabetical).
//! 3. Register it in [`AnalyzerRegistry::builtin`].

mod empty_body;
mod registry;
mod self_assignment;
mod unknown_attribute;
mod unresolved_module;
mod unused_variable;

use std::sync::Arc;

use thiserror::Error;

use crate::base::{FileId, LineIndex, TextRange};
use crate::hir::{Diagnostic, DiagnosticOrigin, Severity, SymbolTable};
use crate::ide::AnalysisConfig;
use crate::project::{LibraryId, NaturalProject};
use crate::syntax::ast::CompilationUnit;
use crate::syntax::visit::{NodeKind, NodeRef};

pub use empty_body::EmptyBody;
pub use registry::AnalyzerRegistry;
pub use self_assignment::SelfAssignment;
pub use unknown_attribute::UnknownAttribute;
pub use unresolved_module::UnresolvedModule;
pub use unused_variable::UnusedVariable;

/// A check over one kind of node.
///
/// Implementations keep no state between calls; whatever they need across
/// files comes from the [`AnalyzerContext`].
pub trait Analyzer: Send + Sync {
    /// Stable id, used as the diagnostic code and in the config.
    fn id(&self) -> &'static str;

    fn interests(&self) -> &'static [NodeKind];

    fn analyze(
        &self,
        node: NodeRef<'_>,
        ctx: &AnalyzerContext<'_>,
        sink: &mut DiagnosticSink,
    ) -> Result<(), AnalyzerError>;
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The analyzer was handed a node it did not ask for.
    #[error("unexpected {0:?} node")]
    UnexpectedNode(NodeKind),

    #[error("{0}")]
    Failed(String),
}

/// Everything an analyzer may look at. All of it is read-only.
pub struct AnalyzerContext<'a> {
    pub file: FileId,
    pub source: &'a str,
    pub unit: &'a CompilationUnit,
    pub symbols: &'a SymbolTable,
    /// Absent when a file is analysed on its own.
    pub project: Option<&'a NaturalProject>,
    pub library: Option<LibraryId>,
    pub config: &'a AnalysisConfig,
    pub line_index: &'a LineIndex,
}

impl AnalyzerContext<'_> {
    pub fn text(&self, range: TextRange) -> &str {
        self.source
            .get(std::ops::Range::<usize>::from(range))
            .unwrap_or("")
    }
}

/// Collects one analyzer's findings for one file.
pub struct DiagnosticSink {
    file: FileId,
    analyzer: &'static str,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(file: FileId, analyzer: &'static str) -> Self {
        Self {
            file,
            analyzer,
            diagnostics: Vec::new(),
        }
    }

    /// Reports a warning coded with the analyzer id.
    pub fn report(&mut self, range: TextRange, message: impl Into<Arc<str>>) {
        self.report_with(Severity::Warning, range, message);
    }

    pub fn report_with(
        &mut self,
        severity: Severity,
        range: TextRange,
        message: impl Into<Arc<str>>,
    ) {
        let origin = DiagnosticOrigin::Analyzer(self.analyzer);
        let diagnostic =
            Diagnostic::new(self.file, range, severity, origin, message).with_code(self.analyzer);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;
    use crate::parser::parse;
    use crate::syntax::ast::UnitKind;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn test_text_slices_source_and_tolerates_bad_ranges() {
        let source = "WRITE #A\nEND";
        let parsed = parse(source, UnitKind::Program);
        let symbols = SymbolTable::default();
        let config = AnalysisConfig::default();
        let ctx = AnalyzerContext {
            file: FileId::new(0),
            source,
            unit: &parsed.unit,
            symbols: &symbols,
            project: None,
            library: None,
            config: &config,
            line_index: &parsed.line_index,
        };
        assert_eq!(ctx.text(range(6, 8)), "#A");
        assert_eq!(ctx.text(range(9, 40)), "");
    }
}
