//! Analyzer: flag calls to modules that no visible library contains.
//!
//! Checks `CALLNAT`, `FETCH`, `INCLUDE` and `PERFORM` of subroutines not
//! defined in the same unit. Only literal module names are checked. Without
//! a project there is nothing to look in, so nothing is reported.

use super::{Analyzer, AnalyzerContext, AnalyzerError, DiagnosticSink};
use crate::base::TextRange;
use crate::hir::Severity;
use crate::project::NaturalFileType;
use crate::syntax::ast::Operand;
use crate::syntax::visit::{NodeKind, NodeRef, walk};

const SUBPROGRAM: &[NaturalFileType] = &[NaturalFileType::Subprogram];
const PROGRAM: &[NaturalFileType] = &[NaturalFileType::Program];
const COPYCODE: &[NaturalFileType] = &[NaturalFileType::Copycode];
const SUBROUTINE: &[NaturalFileType] = &[NaturalFileType::Subroutine];

pub struct UnresolvedModule;

impl Analyzer for UnresolvedModule {
    fn id(&self) -> &'static str {
        "unresolved-module"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[
            NodeKind::CallnatStatement,
            NodeKind::FetchStatement,
            NodeKind::PerformStatement,
            NodeKind::IncludeStatement,
        ]
    }

    fn analyze(
        &self,
        node: NodeRef<'_>,
        ctx: &AnalyzerContext<'_>,
        sink: &mut DiagnosticSink,
    ) -> Result<(), AnalyzerError> {
        let (Some(project), Some(library)) = (ctx.project, ctx.library) else {
            return Ok(());
        };

        let (name, range, kinds): (String, TextRange, &[NaturalFileType]) = match node {
            NodeRef::CallnatStatement(stmt) => match literal_name(&stmt.module) {
                Some(name) => (name, stmt.module.range(), SUBPROGRAM),
                None => return Ok(()),
            },
            NodeRef::FetchStatement(stmt) => match literal_name(&stmt.module) {
                Some(name) => (name, stmt.module.range(), PROGRAM),
                None => return Ok(()),
            },
            NodeRef::IncludeStatement(stmt) => (
                stmt.copycode.name.to_string(),
                stmt.copycode.range,
                COPYCODE,
            ),
            NodeRef::PerformStatement(stmt) => {
                if defines_subroutine(ctx, &stmt.subroutine.name) {
                    return Ok(());
                }
                (
                    stmt.subroutine.name.to_string(),
                    stmt.subroutine.range,
                    SUBROUTINE,
                )
            }
            other => return Err(AnalyzerError::UnexpectedNode(other.kind())),
        };

        if project.find_module(library, &name, kinds).is_none() {
            let library_name = project.library(library).map_or("?", |l| l.name.as_str());
            sink.report_with(
                Severity::Error,
                range,
                format!(
                    "module '{}' not found in library {library_name} or its steplibs",
                    name.to_ascii_uppercase()
                ),
            );
        }
        Ok(())
    }
}

fn literal_name(operand: &Operand) -> Option<String> {
    match operand {
        Operand::Literal(literal) => literal.string_value().map(|s| s.trim().to_string()),
        Operand::Variable(_) | Operand::SystemVariable(_) => None,
    }
}

/// Whether the unit has an inline `DEFINE SUBROUTINE` with this name.
fn defines_subroutine(ctx: &AnalyzerContext<'_>, name: &str) -> bool {
    let mut found = false;
    walk(ctx.unit, |node| {
        if let NodeRef::SubroutineDefinition(def) = node {
            found |= def.name.name.eq_ignore_ascii_case(name);
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::test_support::{run_in, run_one};
    use crate::project::{NaturalProject, XmlNaturalLibrary};

    fn project() -> (NaturalProject, crate::project::LibraryId) {
        let mut project = NaturalProject::new();
        project.merge_libraries(vec![XmlNaturalLibrary {
            name: "APP".into(),
            steplibs: vec!["COMMON".into()],
        }]);
        let app = project.library_by_name("APP").expect("app").id;
        let common = project.library_by_name("COMMON").expect("common").id;
        project.add_file("/p/COMMON/SUB1.NSN", "COMMON/SUB1.NSN", common).expect("sub");
        project.add_file("/p/APP/CC1.NSC", "APP/CC1.NSC", app).expect("copycode");
        (project, app)
    }

    const SOURCE: &str = "DEFINE DATA LOCAL\n1 #NAME (A8)\nEND-DEFINE\n\
                          CALLNAT 'SUB1'\nCALLNAT 'MISSING'\nCALLNAT #NAME\n\
                          INCLUDE CC1\nINCLUDE NOCC\n\
                          PERFORM INLINE\nPERFORM EXTSUB\n\
                          DEFINE SUBROUTINE INLINE\n  IGNORE\nEND-SUBROUTINE\nEND";

    #[test]
    fn test_missing_modules_are_flagged() {
        let (project, app) = project();
        let diagnostics = run_in(&UnresolvedModule, SOURCE, Some((&project, app)));
        let messages: Vec<&str> = diagnostics.iter().map(|d| &*d.message).collect();
        assert_eq!(
            messages,
            [
                "module 'MISSING' not found in library APP or its steplibs",
                "module 'NOCC' not found in library APP or its steplibs",
                "module 'EXTSUB' not found in library APP or its steplibs"
            ]
        );
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn test_without_project_nothing_is_reported() {
        assert!(run_one(&UnresolvedModule, SOURCE).is_empty());
    }
}
