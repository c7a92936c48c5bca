//! Grammar productions, as `impl` blocks on [`Parser`].
//!
//! - [`data`] - `DEFINE DATA` blocks and level-numbered definitions
//! - [`statements`] - statements and block structure
//! - [`expressions`] - operands, variable references, expressions
//! - [`output`] - output/input element lists and attribute lists

mod data;
mod expressions;
mod output;
mod statements;

use super::lexer::Token;
use super::parser::{Parser, SyntaxError};
use super::syntax_kind::SyntaxKind;
use crate::base::{TextRange, TextSize};
use crate::syntax::ast::{CompilationUnit, Identifier, Statement, UnitKind};

impl<'src> Parser<'_, 'src> {
    /// Parses a complete file. Always returns a tree.
    pub(crate) fn parse_compilation_unit(&mut self, kind: UnitKind) -> CompilationUnit {
        let define_data = if self.at(SyntaxKind::DEFINE) && self.peek_kind(1) == SyntaxKind::DATA {
            Some(self.parse_define_data())
        } else {
            if kind.is_data_area() {
                self.report(self.unexpected("DEFINE DATA"));
            }
            None
        };

        let body = if kind.is_data_area() {
            self.reject_trailing_tokens();
            Vec::new()
        } else {
            self.parse_block(&[])
        };

        let end = self.current().range.end();
        CompilationUnit {
            kind,
            define_data,
            body,
            range: TextRange::new(TextSize::from(0), end),
        }
    }

    /// A data area holds nothing but its `DEFINE DATA`.
    fn reject_trailing_tokens(&mut self) {
        if self.at_end() {
            return;
        }
        let start = self.current().range.start();
        while !self.at_end() {
            self.advance();
        }
        self.report(SyntaxError::new(
            "statements are not allowed in a data area",
            self.finish(start),
        ));
    }

    /// Statements up to (not including) one of `terminators`.
    ///
    /// Nested lists also stop at any `END-xxx` so that a missing or
    /// mismatched closing keyword is reported by the enclosing statement
    /// instead of swallowing the rest of the file.
    pub(super) fn parse_block(&mut self, terminators: &[SyntaxKind]) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            while self.eat(SyntaxKind::SEMICOLON).is_some() {}
            let kind = self.kind();
            if kind == SyntaxKind::EOF
                || terminators.contains(&kind)
                || (self.block_depth > 0 && kind.closes_block())
            {
                break;
            }

            let start_pos = self.position();
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => statements.push(Statement::Error(self.recover(start_pos, error))),
            }
        }
        statements
    }

    /// A nested statement list, guarded against runaway nesting.
    pub(super) fn parse_nested_block(
        &mut self,
        terminators: &[SyntaxKind],
    ) -> Result<Vec<Statement>, SyntaxError> {
        self.enter_nesting()?;
        self.block_depth += 1;
        let body = self.parse_block(terminators);
        self.block_depth -= 1;
        self.leave_nesting();
        Ok(body)
    }

    /// Consumes the closing keyword of a block, reporting it when missing.
    ///
    /// A missing `END-xxx` does not discard the block that was parsed.
    pub(super) fn expect_closing(&mut self, kind: SyntaxKind, opened_at: TextRange) {
        if self.eat(kind).is_some() {
            return;
        }
        let found = self.unexpected(kind.describe());
        self.report(SyntaxError::new(
            format!("{}; the block opened here is not closed", found.message),
            opened_at,
        ));
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let label = if self.at_label() {
            let token = self.advance();
            self.advance();
            Some(identifier(&token))
        } else {
            None
        };
        let start = label
            .as_ref()
            .map_or_else(|| self.current().range.start(), |l| l.range.start());

        use SyntaxKind::*;
        match self.kind() {
            WRITE | DISPLAY | PRINT => self.parse_output_statement(start),
            INPUT => self.parse_input_statement(start),
            MOVE => self.parse_move(start),
            ASSIGN | COMPUTE => self.parse_assign(start),
            IDENT => self.parse_implicit_assign(start),
            ADD | SUBTRACT | MULTIPLY | DIVIDE => self.parse_arithmetic(start),
            RESET => self.parse_reset(start),
            COMPRESS => self.parse_compress(start),
            IF => self.parse_if(start),
            DECIDE => self.parse_decide(start),
            FOR => self.parse_for(start, label),
            REPEAT => self.parse_repeat(start, label),
            READ => self.parse_read(start, label),
            FIND => self.parse_find(start, label),
            CALLNAT => self.parse_callnat(start),
            FETCH => self.parse_fetch(start),
            PERFORM => self.parse_perform(start),
            INCLUDE => self.parse_include(start),
            DEFINE => self.parse_define_subroutine(start),
            ESCAPE => self.parse_escape(start),
            IGNORE | STOP | END => Ok(self.parse_simple(start)),
            _ => Err(self.unexpected("a statement")),
        }
    }
}

pub(super) fn identifier(token: &Token<'_>) -> Identifier {
    Identifier::new(token.text, token.range)
}
