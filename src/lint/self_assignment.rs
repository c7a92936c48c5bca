//! Analyzer: flag assignments of a variable to itself.
//!
//! ```text
//! MOVE #A TO #A
//! #A := #A
//! ```

use super::{Analyzer, AnalyzerContext, AnalyzerError, DiagnosticSink};
use crate::syntax::ast::VariableReference;
use crate::syntax::visit::{NodeKind, NodeRef};

pub struct SelfAssignment;

impl Analyzer for SelfAssignment {
    fn id(&self) -> &'static str {
        "self-assignment"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::MoveStatement, NodeKind::AssignStatement]
    }

    fn analyze(
        &self,
        node: NodeRef<'_>,
        ctx: &AnalyzerContext<'_>,
        sink: &mut DiagnosticSink,
    ) -> Result<(), AnalyzerError> {
        match node {
            NodeRef::MoveStatement(stmt) => {
                let Some(source) = stmt.source.as_variable() else {
                    return Ok(());
                };
                for target in &stmt.targets {
                    if same_operand(ctx, source, target) {
                        let message = format!("'{}' is moved to itself", target.display_name());
                        sink.report(stmt.range, message);
                    }
                }
            }
            NodeRef::AssignStatement(stmt) => {
                if let Some(value) = stmt
                    .value
                    .as_variable()
                    .filter(|value| same_operand(ctx, value, &stmt.target))
                {
                    let message = format!("'{}' is assigned to itself", value.display_name());
                    sink.report(stmt.range, message);
                }
            }
            other => return Err(AnalyzerError::UnexpectedNode(other.kind())),
        }
        Ok(())
    }
}

/// Same variable and, when subscripted, the same subscript text.
fn same_operand(ctx: &AnalyzerContext<'_>, a: &VariableReference, b: &VariableReference) -> bool {
    if !a.same_variable(b) {
        return false;
    }
    let squash = |r: &VariableReference| -> String {
        ctx.text(r.range)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase()
    };
    squash(a) == squash(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::test_support::run_one;

    const DATA: &str = "DEFINE DATA LOCAL\n1 #A (N5)\n1 #B (N5)\n1 #ARR (N5/1:3)\nEND-DEFINE\n";

    #[test]
    fn test_self_assignments_are_flagged() {
        let source = format!("{DATA}MOVE #A TO #B #a\n#B := #B\n#ARR(1) := #ARR(1)\nEND");
        let diagnostics = run_one(&SelfAssignment, &source);
        let messages: Vec<&str> = diagnostics.iter().map(|d| &*d.message).collect();
        assert_eq!(
            messages,
            [
                "'#a' is moved to itself",
                "'#B' is assigned to itself",
                "'#ARR' is assigned to itself"
            ]
        );
    }

    #[test]
    fn test_different_operands_are_clean() {
        let source = format!("{DATA}MOVE #A TO #B\n#ARR(1) := #ARR(2)\n#A := #A + 1\nEND");
        assert!(run_one(&SelfAssignment, &source).is_empty());
    }
}
