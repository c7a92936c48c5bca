//! Analyzer: flag local variables that are never referenced.

use super::{Analyzer, AnalyzerContext, AnalyzerError, DiagnosticSink};
use crate::hir::{SymbolKind, SymbolOrigin, VariableScope, VariableSymbol};
use crate::syntax::visit::{NodeKind, NodeRef};

pub struct UnusedVariable;

impl Analyzer for UnusedVariable {
    fn id(&self) -> &'static str {
        "unused-variable"
    }

    /// Runs once per file, on the root.
    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::CompilationUnit]
    }

    fn analyze(
        &self,
        node: NodeRef<'_>,
        ctx: &AnalyzerContext<'_>,
        sink: &mut DiagnosticSink,
    ) -> Result<(), AnalyzerError> {
        let NodeRef::CompilationUnit(unit) = node else {
            return Err(AnalyzerError::UnexpectedNode(node.kind()));
        };
        // Data areas declare variables for others to use.
        if unit.kind.is_data_area() {
            return Ok(());
        }
        for symbol in ctx.symbols.iter().filter(|s| is_unused_local(ctx, s)) {
            sink.report(symbol.range, format!("local variable '{}' is never used", symbol.name));
        }
        Ok(())
    }
}

fn is_unused_local(ctx: &AnalyzerContext<'_>, symbol: &VariableSymbol) -> bool {
    if !matches!(symbol.kind, SymbolKind::Variable | SymbolKind::Constant)
        || symbol.scope != VariableScope::Local
        || symbol.origin != SymbolOrigin::Unit
        || symbol.is_referenced()
    {
        return false;
    }
    // A referenced group uses all of its members.
    let mut parent = symbol.parent;
    while let Some(id) = parent {
        let Some(group) = ctx.symbols.get(id) else {
            break;
        };
        if group.is_referenced() {
            return false;
        }
        parent = group.parent;
    }
    true
}
