//! Lexing and parsing of complete programs.
//!
//! Checks determinism, statement-level recovery, range nesting and the
//! structure projection against whole source texts.

use natparse::base::TextRange;
use natparse::parser::{SyntaxKind, lex, parse};
use natparse::syntax::ast::{DataAreaKind, OutputElement, Statement, UnitKind};
use natparse::syntax::{NodeRef, Structure};
use rstest::rstest;

const REPORT: &str = "\
* Employee report
DEFINE DATA
LOCAL
1 #I (I4)
1 #TOTAL (P9.2)
1 #NAMES (A20/1:10)
1 #LINE
  2 #LEFT (A10)
  2 #RIGHT (A10)
END-DEFINE
FOR #I := 1 TO 10
  IF #NAMES(#I) = ' ' /* skip blanks
    ESCAPE TOP
  END-IF
  WRITE (AD=I) 'Name' #NAMES(#I) 5X #TOTAL (AD=L) / 'Line' #LEFT #RIGHT
END-FOR
COMPUTE ROUNDED #TOTAL = #TOTAL * 1.1 + (#I - 1) ** 2
DISPLAY NOTITLE *DATX #TOTAL
END
";

#[test]
fn test_relexing_is_deterministic() {
    let first = lex(REPORT);
    let second = lex(REPORT);
    assert_eq!(first.tokens, second.tokens);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.comments, second.comments);
    assert_eq!(first.tokens.last().map(|t| t.kind), Some(SyntaxKind::EOF));
}

#[test]
fn test_clean_program_parses_without_diagnostics() {
    let parsed = parse(REPORT, UnitKind::Program);
    assert!(parsed.lex_errors.is_empty(), "{:?}", parsed.lex_errors);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.comments.len(), 2);

    let body = &parsed.unit.body;
    assert_eq!(body.len(), 4, "{body:?}");
    assert!(matches!(body[0], Statement::For(_)));
    assert!(matches!(body[1], Statement::Assign(_)));
    assert!(matches!(body[2], Statement::Output(_)));
    assert!(matches!(body[3], Statement::Simple(_)));
}

#[test]
fn test_one_malformed_statement_keeps_the_rest() {
    let text = "\
DEFINE DATA LOCAL
1 #A (N5)
1 #B (N5)
END-DEFINE
#A := 1
ADD TO #B
#B := #A + 2
WRITE #A #B
END
";
    let parsed = parse(text, UnitKind::Program);
    let body = &parsed.unit.body;
    assert_eq!(body.len(), 5, "{body:?}");
    assert!(matches!(body[0], Statement::Assign(_)));
    assert!(body[1].is_error());
    assert!(matches!(body[2], Statement::Assign(_)));
    assert!(matches!(body[3], Statement::Output(_)));

    assert!(!parsed.diagnostics.is_empty());
    let covered = parsed.diagnostics.iter().any(|d| d.range.contains_range(body[1].range()));
    assert!(covered, "no diagnostic covers {:?}", &text[body[1].range()]);
    assert_eq!(&text[body[1].range()], "ADD TO #B");
}

#[rstest]
#[case::move_target("MOVE #A TO\n#B := 1\nWRITE #B\nEND", "MOVE #A TO")]
#[case::add_target("ADD 1 TO\n#B := 2\nWRITE #B\nEND", "ADD 1 TO")]
#[case::reset_target("RESET\n#B := 2\nWRITE #B\nEND", "RESET")]
#[case::compute_value("COMPUTE #A =\n#B := 2\nWRITE #B\nEND", "COMPUTE #A =")]
fn test_missing_operand_at_line_end_leaves_next_assignment_intact(
    #[case] text: &str,
    #[case] malformed: &str,
) {
    let parsed = parse(text, UnitKind::Program);
    let body = &parsed.unit.body;
    assert_eq!(body.len(), 4, "{body:?}");
    assert!(body[0].is_error());
    assert_eq!(&text[body[0].range()], malformed);
    assert!(matches!(body[1], Statement::Assign(_)));
    assert!(matches!(body[2], Statement::Output(_)));

    assert_eq!(parsed.diagnostics.len(), 1, "{:?}", parsed.diagnostics);
    assert_eq!(parsed.diagnostics[0].range, body[0].range());
}

#[test]
fn test_missing_target_before_labelled_loop() {
    let text = "RESET\nR1. REPEAT\n  WRITE 'x'\nEND-REPEAT\nEND";
    let parsed = parse(text, UnitKind::Program);
    let body = &parsed.unit.body;
    assert_eq!(body.len(), 3, "{body:?}");
    assert_eq!(&text[body[0].range()], "RESET");
    let Statement::Repeat(repeat) = &body[1] else {
        panic!("expected REPEAT, got {:?}", body[1]);
    };
    assert_eq!(repeat.label.as_ref().map(|l| l.name.as_str()), Some("R1"));
    assert_eq!(parsed.diagnostics.len(), 1, "{:?}", parsed.diagnostics);
}

#[test]
fn test_recovery_in_nested_blocks_keeps_closing_keywords() {
    let text = "\
FOR #I = 1 TO 3
  IF #I = 2
    MOVE TO #A
    WRITE #I
  ELSE
    MOVE #I
  END-IF
END-FOR
WRITE 'done'
";
    let parsed = parse(text, UnitKind::Program);
    assert_eq!(parsed.diagnostics.len(), 2, "{:?}", parsed.diagnostics);
    assert_eq!(parsed.unit.body.len(), 2);

    let Statement::For(for_stmt) = &parsed.unit.body[0] else {
        panic!("expected FOR, got {:?}", parsed.unit.body[0]);
    };
    let Statement::If(if_stmt) = &for_stmt.body[0] else {
        panic!("expected IF, got {:?}", for_stmt.body[0]);
    };
    assert_eq!(if_stmt.then_body.len(), 2);
    assert!(if_stmt.then_body[0].is_error());
    let else_body = &if_stmt.else_branch.as_ref().expect("ELSE kept").body;
    assert_eq!(else_body.len(), 1);
    assert!(else_body[0].is_error());
}

#[test]
fn test_data_area_rejects_statements() {
    let parsed = parse("DEFINE DATA LOCAL\n1 #A (A1)\nEND-DEFINE\nWRITE #A\n", UnitKind::Program);
    assert!(parsed.diagnostics.is_empty());

    let parsed = parse(
        "DEFINE DATA LOCAL\n1 #A (A1)\nEND-DEFINE\nWRITE #A\n",
        UnitKind::DataArea(DataAreaKind::Local),
    );
    assert!(parsed.unit.define_data.is_some());
    assert!(!parsed.diagnostics.is_empty());
}

fn assert_nested(node: NodeRef<'_>, source: &str) {
    let outer = node.range();
    for child in node.children() {
        let inner = child.range();
        assert!(
            outer.contains_range(inner),
            "{:?} {:?} is outside its parent {:?} {:?}",
            child.kind(),
            &source[inner],
            node.kind(),
            &source[outer],
        );
        assert_nested(child, source);
    }
}

#[test]
fn test_child_ranges_lie_within_parents() {
    let parsed = parse(REPORT, UnitKind::Program);
    for statement in &parsed.unit.body {
        assert_nested(NodeRef::from_statement(statement), REPORT);
    }

    let text = "IF #A = 1 AND NOT (#B > 2 OR *TRIM(#C) = 'X')\n  #D(1:2) := ABS(#E) - -3\nEND-IF";
    let parsed = parse(text, UnitKind::Program);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    for statement in &parsed.unit.body {
        assert_nested(NodeRef::from_statement(statement), text);
    }
}

#[test]
fn test_structure_projection_yields_statement_operands_in_order() {
    let parsed = parse(REPORT, UnitKind::Program);
    let statements: Vec<&Statement> = parsed
        .unit
        .body
        .iter()
        .chain(loop_bodies(&parsed.unit.body))
        .filter(|s| matches!(s, Statement::Output(_)))
        .collect();
    assert_eq!(statements.len(), 2);

    for statement in statements {
        let Statement::Output(output) = statement else {
            unreachable!();
        };
        let expected: Vec<TextRange> = output
            .elements
            .iter()
            .filter_map(|element| match element {
                OutputElement::Operand(op) => Some(op.operand.range()),
                _ => None,
            })
            .collect();

        let structure = Structure::of(statement).expect("output statements project");
        let projected: Vec<TextRange> = structure.operands().iter().map(|op| op.range()).collect();
        assert_eq!(projected, expected);

        // Re-walking the projected subtrees visits the same expression nodes
        // as the statement's own traversal of its operand elements.
        let from_statement: Vec<TextRange> = NodeRef::from_statement(statement)
            .children()
            .into_iter()
            .filter(|n| matches!(n, NodeRef::OperandElement(_)))
            .flat_map(|n| n.descendants())
            .filter(|n| n.kind().is_expression())
            .map(|n| n.range())
            .collect();
        let from_projection: Vec<TextRange> = structure
            .operand_nodes()
            .into_iter()
            .flat_map(|n| n.descendants())
            .filter(|n| n.kind().is_expression())
            .map(|n| n.range())
            .collect();
        assert!(!from_projection.is_empty());
        assert_eq!(from_projection, from_statement);
    }
}

fn loop_bodies(body: &[Statement]) -> impl Iterator<Item = &Statement> {
    body.iter()
        .filter_map(|statement| match statement {
            Statement::For(stmt) => Some(stmt.body.iter()),
            _ => None,
        })
        .flatten()
}
