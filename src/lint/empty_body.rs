//! Analyzer: flag blocks with no statements.
//!
//! ```text
//! IF #A = 1
//! END-IF
//! ```

use super::{Analyzer, AnalyzerContext, AnalyzerError, DiagnosticSink};
use crate::syntax::visit::{NodeKind, NodeRef};

pub struct EmptyBody;

impl Analyzer for EmptyBody {
    fn id(&self) -> &'static str {
        "empty-body"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[
            NodeKind::IfStatement,
            NodeKind::ForStatement,
            NodeKind::RepeatStatement,
            NodeKind::ReadStatement,
            NodeKind::FindStatement,
            NodeKind::SubroutineDefinition,
        ]
    }

    fn analyze(
        &self,
        node: NodeRef<'_>,
        _ctx: &AnalyzerContext<'_>,
        sink: &mut DiagnosticSink,
    ) -> Result<(), AnalyzerError> {
        let (what, empty) = match node {
            NodeRef::IfStatement(stmt) => {
                if let Some(branch) = stmt.else_branch.as_ref().filter(|b| b.body.is_empty()) {
                    sink.report(branch.range, "ELSE branch has no statements");
                }
                ("IF", stmt.then_body.is_empty())
            }
            NodeRef::ForStatement(stmt) => ("FOR", stmt.body.is_empty()),
            NodeRef::RepeatStatement(stmt) => ("REPEAT", stmt.body.is_empty()),
            NodeRef::ReadStatement(stmt) => ("READ", stmt.body.is_empty()),
            NodeRef::FindStatement(stmt) => ("FIND", stmt.body.is_empty()),
            NodeRef::SubroutineDefinition(def) => ("DEFINE SUBROUTINE", def.body.is_empty()),
            other => return Err(AnalyzerError::UnexpectedNode(other.kind())),
        };
        if empty {
            sink.report(node.range(), format!("{what} block has no statements"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::test_support::run_one;

    #[test]
    fn test_empty_blocks_are_flagged() {
        let diagnostics = run_one(
            &EmptyBody,
            "DEFINE DATA LOCAL\n1 #I (I4)\nEND-DEFINE\n\
             FOR #I = 1 TO 10\nEND-FOR\n\
             IF #I = 1\n  WRITE #I\nELSE\nEND-IF\n\
             DEFINE SUBROUTINE NOTHING\nEND-SUBROUTINE\nEND",
        );
        let messages: Vec<&str> = diagnostics.iter().map(|d| &*d.message).collect();
        assert_eq!(
            messages,
            [
                "FOR block has no statements",
                "ELSE branch has no statements",
                "DEFINE SUBROUTINE block has no statements"
            ]
        );
    }

    #[test]
    fn test_non_empty_blocks_are_clean() {
        let diagnostics = run_one(
            &EmptyBody,
            "DEFINE DATA LOCAL\n1 #I (I4)\nEND-DEFINE\nFOR #I = 1 TO 3\n  WRITE #I\nEND-FOR\nEND",
        );
        assert!(diagnostics.is_empty());
    }
}
