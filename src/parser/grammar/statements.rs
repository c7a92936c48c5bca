//! Statement productions.

use super::identifier;
use crate::base::{TextRange, TextSize};
use crate::parser::parser::{ParseResult, Parser};
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::ast::{
    ArithmeticOp, ArithmeticStatement, AssignKeyword, AssignStatement, Branch, CallnatStatement,
    CompressStatement, DecideForStatement, DecideMode, DecideOnStatement, DecideValueBranch,
    DecideWhenBranch, EscapeKind, EscapeStatement, FetchStatement, FindStatement, ForStatement,
    Identifier, IfStatement, IncludeStatement, Literal, LoopCondition, LoopConditionKind,
    MoveStatement, Operand, PerformStatement, ReadOrder, ReadStatement, RepeatStatement,
    ResetStatement, SimpleStatement, SimpleStatementKind, Statement, SubroutineDefinition,
    VariableReference,
};

impl Parser<'_, '_> {
    // ========================================================================
    // Assignment and arithmetic
    // ========================================================================

    /// `MOVE [ROUNDED] source TO target…`
    pub(super) fn parse_move(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::MOVE)?;
        let rounded = self.eat(SyntaxKind::ROUNDED).is_some();
        let source = self.parse_operand()?;
        self.expect(SyntaxKind::TO)?;
        let targets = self.parse_target_list()?;
        Ok(Statement::Move(MoveStatement {
            rounded,
            source,
            targets,
            range: self.finish(start),
        }))
    }

    /// A variable the statement writes to. It never starts the next line's
    /// assignment or labelled loop.
    fn parse_target(&mut self) -> ParseResult<VariableReference> {
        if self.at_next_statement() {
            return Err(self.unexpected("a target variable"));
        }
        self.parse_variable_reference()
    }

    /// At least one variable, then more up to the next boundary.
    fn parse_target_list(&mut self) -> ParseResult<Vec<VariableReference>> {
        let mut targets = vec![self.parse_target()?];
        while self.at(SyntaxKind::IDENT) && !self.at_element_list_end() {
            targets.push(self.parse_variable_reference()?);
        }
        Ok(targets)
    }

    /// `ASSIGN`/`COMPUTE [ROUNDED] target =|:= expression`
    pub(super) fn parse_assign(&mut self, start: TextSize) -> ParseResult<Statement> {
        let keyword = match self.advance().kind {
            SyntaxKind::COMPUTE => AssignKeyword::Compute,
            _ => AssignKeyword::Assign,
        };
        let rounded = self.eat(SyntaxKind::ROUNDED).is_some();
        let target = self.parse_target()?;
        if self.eat(SyntaxKind::EQUALS).is_none() {
            self.expect(SyntaxKind::COLON_EQUALS)?;
        }
        let value = self.parse_expression()?;
        Ok(Statement::Assign(AssignStatement {
            keyword,
            rounded,
            target,
            value,
            range: self.finish(start),
        }))
    }

    /// `target := expression`
    pub(super) fn parse_implicit_assign(&mut self, start: TextSize) -> ParseResult<Statement> {
        let target = self.parse_variable_reference()?;
        self.expect(SyntaxKind::COLON_EQUALS)?;
        let value = self.parse_expression()?;
        Ok(Statement::Assign(AssignStatement {
            keyword: AssignKeyword::Implicit,
            rounded: false,
            target,
            value,
            range: self.finish(start),
        }))
    }

    /// `ADD a b TO c`, `SUBTRACT a FROM c`, `MULTIPLY c BY a`,
    /// `DIVIDE a INTO c`, each with an optional `GIVING target`.
    pub(super) fn parse_arithmetic(&mut self, start: TextSize) -> ParseResult<Statement> {
        let op = match self.advance().kind {
            SyntaxKind::SUBTRACT => ArithmeticOp::Subtract,
            SyntaxKind::MULTIPLY => ArithmeticOp::Multiply,
            SyntaxKind::DIVIDE => ArithmeticOp::Divide,
            _ => ArithmeticOp::Add,
        };
        let rounded = self.eat(SyntaxKind::ROUNDED).is_some();

        let (operands, target) = match op {
            ArithmeticOp::Multiply => {
                let target = self.parse_operand()?;
                self.expect(SyntaxKind::BY)?;
                (self.parse_operands_until(None)?, target)
            }
            ArithmeticOp::Add | ArithmeticOp::Subtract | ArithmeticOp::Divide => {
                let separator = match op {
                    ArithmeticOp::Add => SyntaxKind::TO,
                    ArithmeticOp::Subtract => SyntaxKind::FROM,
                    _ => SyntaxKind::INTO,
                };
                let operands = self.parse_operands_until(Some(separator))?;
                self.expect(separator)?;
                (operands, self.parse_operand()?)
            }
        };

        let giving = if self.eat(SyntaxKind::GIVING).is_some() {
            Some(self.parse_target()?)
        } else {
            None
        };

        Ok(Statement::Arithmetic(ArithmeticStatement {
            op,
            rounded,
            operands,
            target,
            giving,
            range: self.finish(start),
        }))
    }

    /// One or more operands, stopping at `until` or the end of the list.
    fn parse_operands_until(&mut self, until: Option<SyntaxKind>) -> ParseResult<Vec<Operand>> {
        let mut operands = vec![self.parse_operand()?];
        while until.is_none_or(|kind| !self.at(kind))
            && self.at_operand_start()
            && !self.at_element_list_end()
        {
            operands.push(self.parse_operand()?);
        }
        Ok(operands)
    }

    /// `RESET [INITIAL] target…`
    pub(super) fn parse_reset(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::RESET)?;
        let initial = self.eat(SyntaxKind::INITIAL).is_some();
        let targets = self.parse_target_list()?;
        Ok(Statement::Reset(ResetStatement {
            initial,
            targets,
            range: self.finish(start),
        }))
    }

    /// `COMPRESS operand… INTO target [LEAVING NO [SPACE]]`
    pub(super) fn parse_compress(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::COMPRESS)?;
        let operands = self.parse_operands_until(Some(SyntaxKind::INTO))?;
        self.expect(SyntaxKind::INTO)?;
        let into = self.parse_target()?;
        let leaving_no_space = if self.eat(SyntaxKind::LEAVING).is_some() {
            self.expect(SyntaxKind::NO)?;
            self.eat(SyntaxKind::SPACE);
            true
        } else {
            false
        };
        Ok(Statement::Compress(CompressStatement {
            operands,
            into,
            leaving_no_space,
            range: self.finish(start),
        }))
    }

    // ========================================================================
    // Control structures
    // ========================================================================

    /// `IF cond [THEN] … [ELSE …] END-IF`
    pub(super) fn parse_if(&mut self, start: TextSize) -> ParseResult<Statement> {
        let keyword = self.expect(SyntaxKind::IF)?;
        let condition = self.parse_expression()?;
        self.eat(SyntaxKind::THEN);
        let then_body = self.parse_nested_block(&[SyntaxKind::ELSE, SyntaxKind::END_IF])?;

        let else_branch = if self.at(SyntaxKind::ELSE) {
            let else_start = self.advance().range.start();
            let body = self.parse_nested_block(&[SyntaxKind::END_IF])?;
            Some(Branch {
                body,
                range: self.finish(else_start),
            })
        } else {
            None
        };
        self.expect_closing(SyntaxKind::END_IF, keyword.range);

        Ok(Statement::If(IfStatement {
            condition,
            then_body,
            else_branch,
            range: self.finish(start),
        }))
    }

    fn parse_decide_mode(&mut self) -> ParseResult<DecideMode> {
        if self.eat(SyntaxKind::FIRST).is_some() {
            Ok(DecideMode::First)
        } else if self.eat(SyntaxKind::EVERY).is_some() {
            Ok(DecideMode::Every)
        } else {
            Err(self.unexpected("FIRST or EVERY"))
        }
    }

    /// A `NONE`/`ANY`/`ALL` clause whose keyword has not been consumed yet.
    fn parse_branch(&mut self, terminators: &[SyntaxKind]) -> ParseResult<Branch> {
        let start = self.advance().range.start();
        self.eat(SyntaxKind::VALUE);
        let body = self.parse_nested_block(terminators)?;
        Ok(Branch {
            body,
            range: self.finish(start),
        })
    }

    pub(super) fn parse_decide(&mut self, start: TextSize) -> ParseResult<Statement> {
        let keyword = self.expect(SyntaxKind::DECIDE)?;
        match self.kind() {
            SyntaxKind::ON => self.parse_decide_on(start, keyword.range),
            SyntaxKind::FOR => self.parse_decide_for(start, keyword.range),
            _ => Err(self.unexpected("ON or FOR")),
        }
    }

    /// `DECIDE ON FIRST|EVERY [VALUE [OF]] operand VALUE …`
    /// `[ANY …] [ALL …] NONE … END-DECIDE`
    fn parse_decide_on(&mut self, start: TextSize, opened_at: TextRange) -> ParseResult<Statement> {
        const TERMINATORS: &[SyntaxKind] = &[
            SyntaxKind::VALUE,
            SyntaxKind::ANY,
            SyntaxKind::ALL,
            SyntaxKind::NONE,
            SyntaxKind::END_DECIDE,
        ];

        self.expect(SyntaxKind::ON)?;
        let mode = self.parse_decide_mode()?;
        if self.eat(SyntaxKind::VALUE).is_some() {
            self.eat(SyntaxKind::OF);
        }
        let operand = self.parse_operand()?;

        let mut branches = Vec::new();
        while self.at(SyntaxKind::VALUE) {
            let branch_start = self.advance().range.start();
            let mut values = vec![self.parse_operand()?];
            loop {
                if self.eat(SyntaxKind::COMMA).is_some() || self.eat(SyntaxKind::COLON).is_some() {
                    values.push(self.parse_operand()?);
                } else {
                    break;
                }
            }
            let body = self.parse_nested_block(TERMINATORS)?;
            branches.push(DecideValueBranch {
                values,
                body,
                range: self.finish(branch_start),
            });
        }
        if branches.is_empty() {
            self.report(self.unexpected("a VALUE clause"));
        }

        let any = if self.at(SyntaxKind::ANY) {
            Some(self.parse_branch(TERMINATORS)?)
        } else {
            None
        };
        let all = if self.at(SyntaxKind::ALL) {
            Some(self.parse_branch(TERMINATORS)?)
        } else {
            None
        };
        let none = if self.at(SyntaxKind::NONE) {
            Some(self.parse_branch(&[SyntaxKind::END_DECIDE])?)
        } else {
            self.report(self.unexpected("a NONE clause"));
            None
        };
        self.expect_closing(SyntaxKind::END_DECIDE, opened_at);

        Ok(Statement::DecideOn(DecideOnStatement {
            mode,
            operand,
            branches,
            any,
            all,
            none,
            range: self.finish(start),
        }))
    }

    /// `DECIDE FOR FIRST|EVERY CONDITION WHEN cond …`
    /// `[WHEN ANY …] [WHEN ALL …] WHEN NONE … END-DECIDE`
    fn parse_decide_for(
        &mut self,
        start: TextSize,
        opened_at: TextRange,
    ) -> ParseResult<Statement> {
        const TERMINATORS: &[SyntaxKind] = &[SyntaxKind::WHEN, SyntaxKind::END_DECIDE];

        self.expect(SyntaxKind::FOR)?;
        let mode = self.parse_decide_mode()?;
        self.expect(SyntaxKind::CONDITION)?;

        let mut branches = Vec::new();
        let mut any = None;
        let mut all = None;
        let mut none = None;
        while self.at(SyntaxKind::WHEN) {
            let clause = self.peek_kind(1);
            if matches!(clause, SyntaxKind::ANY | SyntaxKind::ALL | SyntaxKind::NONE) {
                let when_start = self.advance().range.start();
                self.advance();
                let body = self.parse_nested_block(TERMINATORS)?;
                let branch = Some(Branch {
                    body,
                    range: self.finish(when_start),
                });
                match clause {
                    SyntaxKind::ANY => any = branch,
                    SyntaxKind::ALL => all = branch,
                    _ => none = branch,
                }
                continue;
            }

            let when_start = self.advance().range.start();
            let condition = self.parse_expression()?;
            let body = self.parse_nested_block(TERMINATORS)?;
            branches.push(DecideWhenBranch {
                condition,
                body,
                range: self.finish(when_start),
            });
        }
        if none.is_none() {
            self.report(self.unexpected("WHEN NONE"));
        }
        self.expect_closing(SyntaxKind::END_DECIDE, opened_at);

        Ok(Statement::DecideFor(DecideForStatement {
            mode,
            branches,
            any,
            all,
            none,
            range: self.finish(start),
        }))
    }

    /// `FOR v [:=|=|FROM] a TO b [STEP c] … END-FOR`
    pub(super) fn parse_for(
        &mut self,
        start: TextSize,
        label: Option<Identifier>,
    ) -> ParseResult<Statement> {
        let keyword = self.expect(SyntaxKind::FOR)?;
        let variable = self.parse_variable_reference()?;
        if self.eat(SyntaxKind::COLON_EQUALS).is_none()
            && self.eat(SyntaxKind::EQUALS).is_none()
        {
            self.eat(SyntaxKind::FROM);
        }
        let from = self.parse_expression()?;
        if self.eat(SyntaxKind::TO).is_none() {
            self.expect(SyntaxKind::THRU)?;
        }
        let to = self.parse_expression()?;
        let step = if self.eat(SyntaxKind::STEP).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let body = self.parse_nested_block(&[SyntaxKind::END_FOR])?;
        self.expect_closing(SyntaxKind::END_FOR, keyword.range);

        Ok(Statement::For(ForStatement {
            label,
            variable,
            from,
            to,
            step,
            body,
            range: self.finish(start),
        }))
    }

    fn parse_loop_condition(&mut self) -> ParseResult<Option<LoopCondition>> {
        let kind = match self.kind() {
            SyntaxKind::UNTIL => LoopConditionKind::Until,
            SyntaxKind::WHILE => LoopConditionKind::While,
            _ => return Ok(None),
        };
        let start = self.advance().range.start();
        let condition = self.parse_expression()?;
        Ok(Some(LoopCondition {
            kind,
            condition,
            range: self.finish(start),
        }))
    }

    /// `REPEAT [UNTIL|WHILE c] … [UNTIL|WHILE c] END-REPEAT`
    pub(super) fn parse_repeat(
        &mut self,
        start: TextSize,
        label: Option<Identifier>,
    ) -> ParseResult<Statement> {
        let keyword = self.expect(SyntaxKind::REPEAT)?;
        let leading = self.parse_loop_condition()?;
        let body = self.parse_nested_block(&[
            SyntaxKind::UNTIL,
            SyntaxKind::WHILE,
            SyntaxKind::END_REPEAT,
        ])?;
        let trailing = self.parse_loop_condition()?;
        self.expect_closing(SyntaxKind::END_REPEAT, keyword.range);

        Ok(Statement::Repeat(RepeatStatement {
            label,
            leading,
            body,
            trailing,
            range: self.finish(start),
        }))
    }

    fn parse_read_limit(&mut self) -> ParseResult<Option<Literal>> {
        if !self.at(SyntaxKind::LPAREN) {
            return Ok(None);
        }
        self.advance();
        let limit = self.parse_literal()?;
        self.expect(SyntaxKind::RPAREN)?;
        Ok(Some(limit))
    }

    // ========================================================================
    // Database access
    // ========================================================================

    /// `READ [(n)] view [PHYSICAL|LOGICAL]`
    /// `[BY|WITH descriptor [STARTING FROM|FROM|= v] [ENDING AT|THRU|TO v]]`
    /// `[WHERE c] … END-READ`
    pub(super) fn parse_read(
        &mut self,
        start: TextSize,
        label: Option<Identifier>,
    ) -> ParseResult<Statement> {
        let keyword = self.expect(SyntaxKind::READ)?;
        let limit = self.parse_read_limit()?;
        let view = identifier(&self.expect(SyntaxKind::IDENT)?);
        let order = if self.eat(SyntaxKind::PHYSICAL).is_some() {
            ReadOrder::Physical
        } else if self.eat(SyntaxKind::LOGICAL).is_some() {
            ReadOrder::Logical
        } else {
            ReadOrder::Unspecified
        };

        let mut descriptor = None;
        let mut starting = None;
        let mut ending = None;
        if self.eat(SyntaxKind::BY).is_some() || self.eat(SyntaxKind::WITH).is_some() {
            descriptor = Some(identifier(&self.expect(SyntaxKind::IDENT)?));
            let has_start = if self.eat(SyntaxKind::STARTING).is_some() {
                self.expect(SyntaxKind::FROM)?;
                true
            } else {
                self.eat(SyntaxKind::FROM).is_some()
                    || self.eat(SyntaxKind::EQUALS).is_some()
                    || self.eat(SyntaxKind::EQ).is_some()
            };
            if has_start {
                starting = Some(self.parse_expression()?);
            }
            let has_end = if self.eat(SyntaxKind::ENDING).is_some() {
                self.expect(SyntaxKind::AT)?;
                true
            } else {
                self.eat(SyntaxKind::THRU).is_some() || self.eat(SyntaxKind::TO).is_some()
            };
            if has_end {
                ending = Some(self.parse_expression()?);
            }
        }

        let where_clause = if self.eat(SyntaxKind::WHERE).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let body = self.parse_nested_block(&[SyntaxKind::END_READ])?;
        self.expect_closing(SyntaxKind::END_READ, keyword.range);

        Ok(Statement::Read(ReadStatement {
            label,
            limit,
            view,
            order,
            descriptor,
            starting,
            ending,
            where_clause,
            body,
            range: self.finish(start),
        }))
    }

    /// `FIND [(n)] view WITH criteria [WHERE c] … END-FIND`
    pub(super) fn parse_find(
        &mut self,
        start: TextSize,
        label: Option<Identifier>,
    ) -> ParseResult<Statement> {
        let keyword = self.expect(SyntaxKind::FIND)?;
        let limit = self.parse_read_limit()?;
        let view = identifier(&self.expect(SyntaxKind::IDENT)?);
        self.expect(SyntaxKind::WITH)?;
        let criteria = self.parse_expression()?;
        let where_clause = if self.eat(SyntaxKind::WHERE).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let body = self.parse_nested_block(&[SyntaxKind::END_FIND])?;
        self.expect_closing(SyntaxKind::END_FIND, keyword.range);

        Ok(Statement::Find(FindStatement {
            label,
            limit,
            view,
            criteria,
            where_clause,
            body,
            range: self.finish(start),
        }))
    }

    // ========================================================================
    // Modules
    // ========================================================================

    pub(super) fn parse_callnat(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::CALLNAT)?;
        let module = self.parse_operand()?;
        let parameters = self.parse_module_parameters()?;
        Ok(Statement::Callnat(CallnatStatement {
            module,
            parameters,
            range: self.finish(start),
        }))
    }

    pub(super) fn parse_fetch(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::FETCH)?;
        let returning = self.eat(SyntaxKind::RETURN).is_some();
        let module = self.parse_operand()?;
        let parameters = self.parse_module_parameters()?;
        Ok(Statement::Fetch(FetchStatement {
            returning,
            module,
            parameters,
            range: self.finish(start),
        }))
    }

    pub(super) fn parse_perform(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::PERFORM)?;
        let subroutine = identifier(&self.expect_name(true)?);
        let parameters = self.parse_module_parameters()?;
        Ok(Statement::Perform(PerformStatement {
            subroutine,
            parameters,
            range: self.finish(start),
        }))
    }

    /// `INCLUDE copycode ['param'…]`
    pub(super) fn parse_include(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::INCLUDE)?;
        let copycode = identifier(&self.expect_name(true)?);
        let mut parameters = Vec::new();
        while self.at(SyntaxKind::STRING) && !self.at_boundary() {
            parameters.push(self.parse_literal()?);
        }
        Ok(Statement::Include(IncludeStatement {
            copycode,
            parameters,
            range: self.finish(start),
        }))
    }

    /// `DEFINE SUBROUTINE name … END-SUBROUTINE`
    pub(super) fn parse_define_subroutine(&mut self, start: TextSize) -> ParseResult<Statement> {
        let keyword = self.expect(SyntaxKind::DEFINE)?;
        if self.at(SyntaxKind::DATA) {
            return Err(self.unexpected("SUBROUTINE; DEFINE DATA must come first"));
        }
        self.expect(SyntaxKind::SUBROUTINE)?;
        let name = identifier(&self.expect_name(true)?);
        let body = self.parse_nested_block(&[SyntaxKind::END_SUBROUTINE])?;
        self.expect_closing(SyntaxKind::END_SUBROUTINE, keyword.range);
        Ok(Statement::DefineSubroutine(SubroutineDefinition {
            name,
            body,
            range: self.finish(start),
        }))
    }

    // ========================================================================
    // Simple statements
    // ========================================================================

    /// `ESCAPE TOP|BOTTOM [(label.)]|ROUTINE|MODULE`
    pub(super) fn parse_escape(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::ESCAPE)?;
        let kind = match self.kind() {
            SyntaxKind::TOP => EscapeKind::Top,
            SyntaxKind::BOTTOM => EscapeKind::Bottom,
            SyntaxKind::ROUTINE => EscapeKind::Routine,
            SyntaxKind::MODULE => EscapeKind::Module,
            _ => return Err(self.unexpected("TOP, BOTTOM, ROUTINE or MODULE")),
        };
        self.advance();
        if kind == EscapeKind::Bottom
            && self.at(SyntaxKind::LPAREN)
            && self.peek_kind(1) == SyntaxKind::IDENT
            && self.peek_kind(2) == SyntaxKind::DOT
        {
            self.advance();
            self.advance();
            self.advance();
            self.expect(SyntaxKind::RPAREN)?;
        }
        Ok(Statement::Escape(EscapeStatement {
            kind,
            range: self.finish(start),
        }))
    }

    pub(super) fn parse_simple(&mut self, start: TextSize) -> Statement {
        let kind = match self.advance().kind {
            SyntaxKind::IGNORE => SimpleStatementKind::Ignore,
            SyntaxKind::STOP => SimpleStatementKind::Stop,
            _ => SimpleStatementKind::End,
        };
        Statement::Simple(SimpleStatement {
            kind,
            range: self.finish(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::syntax::ast::*;
    use rstest::rstest;

    fn program(text: &str) -> CompilationUnit {
        let parse = parse(text, UnitKind::Program);
        assert!(parse.diagnostics.is_empty(), "{:?}", parse.diagnostics);
        parse.unit
    }

    #[rstest]
    #[case("MOVE 'A' TO #B #C")]
    #[case("ASSIGN #A = 1")]
    #[case("COMPUTE ROUNDED #A = #B / 3")]
    #[case("#ARR(#I) := #I * 2")]
    #[case("ADD 1 2 TO #A GIVING #B")]
    #[case("SUBTRACT 1 FROM #A")]
    #[case("MULTIPLY #A BY 3")]
    #[case("DIVIDE 4 INTO #A GIVING #Q")]
    #[case("RESET INITIAL #A #B")]
    #[case("COMPRESS #A 'x' INTO #B LEAVING NO SPACE")]
    #[case("CALLNAT 'SUBPROG' #A (AD=O) 2X #B")]
    #[case("FETCH RETURN 'PROG' #A")]
    #[case("PERFORM GET-DATA #A")]
    #[case("INCLUDE CPYCODE '#A' '5'")]
    #[case("ESCAPE BOTTOM (R1.)")]
    #[case("IGNORE")]
    fn test_single_line_statements(#[case] text: &str) {
        let unit = program(text);
        assert_eq!(unit.body.len(), 1, "{:?}", unit.body);
        assert!(!unit.body[0].range().is_empty());
    }

    #[test]
    fn test_if_else_structure() {
        let unit = program(
            "IF #A = 1 THEN\n  WRITE 'one'\nELSE\n  WRITE 'other'\n  IGNORE\nEND-IF\nEND",
        );
        assert_eq!(unit.body.len(), 2);
        let Statement::If(stmt) = &unit.body[0] else {
            panic!("expected IF");
        };
        assert_eq!(stmt.then_body.len(), 1);
        assert_eq!(stmt.else_branch.as_ref().map(|b| b.body.len()), Some(2));
    }

    #[test]
    fn test_decide_on_branches() {
        let unit = program(
            "DECIDE ON FIRST VALUE OF #CODE\n\
             VALUE 'A', 'B'\n  WRITE 'ab'\n\
             VALUE 'C'\n  WRITE 'c'\n\
             ANY VALUE\n  IGNORE\n\
             NONE VALUE\n  IGNORE\n\
             END-DECIDE",
        );
        let Statement::DecideOn(decide) = &unit.body[0] else {
            panic!("expected DECIDE ON");
        };
        assert_eq!(decide.mode, DecideMode::First);
        assert_eq!(decide.branches.len(), 2);
        assert_eq!(decide.branches[0].values.len(), 2);
        assert!(decide.any.is_some() && decide.none.is_some());
    }

    #[test]
    fn test_decide_for_conditions() {
        let unit = program(
            "DECIDE FOR EVERY CONDITION\n\
             WHEN #A > 1\n  WRITE 'big'\n\
             WHEN #B = 'X' AND #C\n  IGNORE\n\
             WHEN NONE\n  IGNORE\n\
             END-DECIDE",
        );
        let Statement::DecideFor(decide) = &unit.body[0] else {
            panic!("expected DECIDE FOR");
        };
        assert_eq!(decide.mode, DecideMode::Every);
        assert_eq!(decide.branches.len(), 2);
        assert!(decide.none.is_some());
    }

    #[test]
    fn test_loops_and_labels() {
        let unit = program(
            "F1. FOR #I := 1 TO 10 STEP 2\n  WRITE #I\nEND-FOR\n\
             REPEAT UNTIL #I > 5\n  ADD 1 TO #I\nEND-REPEAT\n\
             REPEAT\n  ADD 1 TO #I\n  WHILE #I < 20\nEND-REPEAT",
        );
        assert_eq!(unit.body.len(), 3);
        let Statement::For(for_stmt) = &unit.body[0] else {
            panic!("expected FOR");
        };
        assert_eq!(for_stmt.label.as_ref().map(|l| l.name.as_str()), Some("F1"));
        assert!(for_stmt.step.is_some());
        assert!(matches!(&unit.body[1], Statement::Repeat(r) if r.leading.is_some()));
        assert!(matches!(&unit.body[2], Statement::Repeat(r) if r.trailing.is_some()));
    }

    #[test]
    fn test_read_and_find() {
        let unit = program(
            "R1. READ (10) EMP BY NAME STARTING FROM 'A' ENDING AT 'B'\n\
               WRITE NAME\n\
             END-READ\n\
             FIND EMP WITH CITY = 'PARIS' WHERE SALARY > 1000\n\
               IGNORE\n\
             END-FIND",
        );
        let Statement::Read(read) = &unit.body[0] else {
            panic!("expected READ");
        };
        assert_eq!(read.view.name, "EMP");
        assert_eq!(read.descriptor.as_ref().map(|d| d.name.as_str()), Some("NAME"));
        assert!(read.starting.is_some() && read.ending.is_some());
        assert_eq!(read.limit.as_ref().map(|l| l.text.as_str()), Some("10"));
        assert!(matches!(&unit.body[1], Statement::Find(f) if f.where_clause.is_some()));
    }

    #[test]
    fn test_subroutine_definition() {
        let unit = program("DEFINE SUBROUTINE CALC\n  #A := 1\nEND-SUBROUTINE\nEND");
        assert!(matches!(
            &unit.body[0],
            Statement::DefineSubroutine(s) if s.name.name == "CALC" && s.body.len() == 1
        ));
    }
}
