use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashMap;

use super::{Analyzer, AnalyzerContext, DiagnosticSink};
use super::{EmptyBody, SelfAssignment, UnknownAttribute, UnresolvedModule, UnusedVariable};
use crate::hir::{Diagnostic, DiagnosticOrigin, codes};
use crate::syntax::visit::{NodeKind, NodeRef, walk};

/// Registered analyzers and the node kinds they are dispatched on.
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn Analyzer>>,
    /// Node kind to analyzer indices, in registration order.
    dispatch: FxHashMap<NodeKind, Vec<usize>>,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AnalyzerRegistry {
    /// No analyzers at all.
    pub fn empty() -> Self {
        Self {
            analyzers: Vec::new(),
            dispatch: FxHashMap::default(),
        }
    }

    /// Every analyzer shipped with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Box::new(EmptyBody))
            .register(Box::new(SelfAssignment))
            .register(Box::new(UnknownAttribute))
            .register(Box::new(UnresolvedModule))
            .register(Box::new(UnusedVariable));
        registry
    }

    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) -> &mut Self {
        let index = self.analyzers.len();
        for &kind in analyzer.interests() {
            self.dispatch.entry(kind).or_default().push(index);
        }
        self.analyzers.push(analyzer);
        self
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.analyzers.iter().map(|a| a.id())
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Runs every enabled analyzer over `ctx.unit` in one traversal.
    ///
    /// An analyzer that fails or panics loses all its findings for the file
    /// and sees no further nodes; one framework diagnostic records why.
    /// Findings come out grouped per analyzer in registration order,
    /// followed by the framework diagnostics.
    pub fn run(&self, ctx: &AnalyzerContext<'_>) -> Vec<Diagnostic> {
        let count = self.analyzers.len();
        let enabled: Vec<bool> = self
            .analyzers
            .iter()
            .map(|a| ctx.config.analyzers.is_enabled(a.id()))
            .collect();
        let mut buffers: Vec<Vec<Diagnostic>> = vec![Vec::new(); count];
        let mut failed = vec![false; count];
        let mut framework = Vec::new();

        walk(ctx.unit, |node| {
            let Some(indices) = self.dispatch.get(&node.kind()) else {
                return;
            };
            for &index in indices {
                if !enabled[index] || failed[index] {
                    continue;
                }
                let analyzer = &self.analyzers[index];
                let mut sink = DiagnosticSink::new(ctx.file, analyzer.id());
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    analyzer.analyze(node, ctx, &mut sink)
                }));
                let reason = match outcome {
                    Ok(Ok(())) => {
                        buffers[index].extend(sink.into_diagnostics());
                        continue;
                    }
                    Ok(Err(err)) => err.to_string(),
                    Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
                };
                failed[index] = true;
                buffers[index].clear();
                framework.push(failure(ctx, node, analyzer.id(), &reason));
            }
        });

        buffers.into_iter().flatten().chain(framework).collect()
    }
}

fn failure(
    ctx: &AnalyzerContext<'_>,
    node: NodeRef<'_>,
    id: &'static str,
    reason: &str,
) -> Diagnostic {
    tracing::warn!(
        file = ?ctx.file,
        analyzer = id,
        node = ?node.kind(),
        %reason,
        "analyzer failed"
    );
    Diagnostic::error(
        ctx.file,
        node.range(),
        DiagnosticOrigin::Framework,
        format!(
            "analyzer '{id}' failed on {:?}: {reason}; its findings for this file were dropped",
            node.kind()
        ),
    )
    .with_code(codes::ANALYZER_FAILED)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::{NoExternalDefinitions, ScopeResolver};
    use crate::ide::AnalysisConfig;
    use crate::lint::AnalyzerError;
    use crate::parser::parse;
    use crate::syntax::ast::UnitKind;

    /// Reports every MOVE, then fails on the first IF.
    struct FailsOnIf;

    impl Analyzer for FailsOnIf {
        fn id(&self) -> &'static str {
            "fails-on-if"
        }

        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::MoveStatement, NodeKind::IfStatement]
        }

        fn analyze(
            &self,
            node: NodeRef<'_>,
            _: &AnalyzerContext<'_>,
            sink: &mut DiagnosticSink,
        ) -> Result<(), AnalyzerError> {
            match node {
                NodeRef::IfStatement(_) => Err(AnalyzerError::Failed("cannot handle IF".into())),
                other => {
                    sink.report(other.range(), "move seen");
                    Ok(())
                }
            }
        }
    }

    struct PanicsOnWrite;

    impl Analyzer for PanicsOnWrite {
        fn id(&self) -> &'static str {
            "panics-on-write"
        }

        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::OutputStatement]
        }

        fn analyze(
            &self,
            _: NodeRef<'_>,
            _: &AnalyzerContext<'_>,
            _: &mut DiagnosticSink,
        ) -> Result<(), AnalyzerError> {
            panic!("boom");
        }
    }

    fn run(registry: &AnalyzerRegistry, source: &str, config: &AnalysisConfig) -> Vec<Diagnostic> {
        let parse = parse(source, UnitKind::Program);
        let mut unit = parse.unit;
        let file = FileId::new(7);
        let resolution = ScopeResolver::new(file, &NoExternalDefinitions).resolve(&mut unit);
        let ctx = AnalyzerContext {
            file,
            source,
            unit: &unit,
            symbols: &resolution.symbols,
            project: None,
            library: None,
            config,
            line_index: &parse.line_index,
        };
        registry.run(&ctx)
    }

    const SOURCE: &str = "DEFINE DATA LOCAL\n1 #A (N5)\n1 #UNUSED (N5)\nEND-DEFINE\n\
                          MOVE 1 TO #A\nIF #A = 1\nEND-IF\nMOVE #A TO #A\nWRITE #A\nEND";

    #[test]
    fn test_failing_analyzer_is_isolated() {
        let mut registry = AnalyzerRegistry::empty();
        registry
            .register(Box::new(FailsOnIf))
            .register(Box::new(PanicsOnWrite))
            .register(Box::new(EmptyBody))
            .register(Box::new(SelfAssignment))
            .register(Box::new(UnusedVariable));

        let diagnostics = run(&registry, SOURCE, &AnalysisConfig::default());
        let codes: Vec<&str> = diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
        assert_eq!(
            codes,
            [
                "empty-body",
                "self-assignment",
                "unused-variable",
                codes::ANALYZER_FAILED,
                codes::ANALYZER_FAILED
            ]
        );
        assert!(diagnostics[3].message.contains("fails-on-if"));
        assert!(diagnostics[4].message.contains("boom"));
        assert!(diagnostics.iter().all(|d| &*d.message != "move seen"));
    }

    #[test]
    fn test_disabled_analyzers_do_not_run() {
        let config = AnalysisConfig::default().with_disabled("unused-variable");
        let diagnostics = run(&AnalyzerRegistry::builtin(), SOURCE, &config);
        assert!(diagnostics.iter().all(|d| d.code.as_deref() != Some("unused-variable")));
        assert!(diagnostics.iter().any(|d| d.code.as_deref() == Some("empty-body")));
    }

    #[test]
    fn test_builtin_ids() {
        let ids: Vec<&str> = AnalyzerRegistry::builtin().ids().collect();
        assert_eq!(
            ids,
            [
                "empty-body",
                "self-assignment",
                "unknown-attribute",
                "unresolved-module",
                "unused-variable"
            ]
        );
    }
}
