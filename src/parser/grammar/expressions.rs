//! Operands, variable references and arithmetic/logical expressions.
//!
//! Binary operators use the binding-power table in
//! [`binary_binding_power`]; prefix `NOT` and unary sign are handled in
//! [`Parser::parse_prefix`].

use smol_str::SmolStr;

use super::identifier;
use crate::base::TextRange;
use crate::parser::parser::{
    NOT_BINDING_POWER, ParseResult, Parser, SIGN_BINDING_POWER, binary_binding_power,
};
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::ast::{
    BinaryExpression, BinaryOp, Expression, FunctionCall, Identifier, Literal, LiteralKind, Operand,
    ParenExpression, Subscript, SystemVariable, UnaryExpression, UnaryOp, VariableReference,
};

/// Built-in functions callable without a `*` prefix.
const BUILTIN_FUNCTIONS: &[&str] = &["ABS", "FRAC", "INT", "SGN", "SQRT", "VAL", "POS", "RET"];

fn binary_op(kind: SyntaxKind) -> Option<BinaryOp> {
    use SyntaxKind::*;
    let op = match kind {
        OR => BinaryOp::Or,
        AND => BinaryOp::And,
        EQUALS | EQ => BinaryOp::Equal,
        NOT_EQUAL | NE => BinaryOp::NotEqual,
        LESS | LT => BinaryOp::Less,
        LESS_EQUAL | LE => BinaryOp::LessEqual,
        GREATER | GT => BinaryOp::Greater,
        GREATER_EQUAL | GE => BinaryOp::GreaterEqual,
        PLUS => BinaryOp::Add,
        MINUS => BinaryOp::Subtract,
        ASTERISK => BinaryOp::Multiply,
        SLASH => BinaryOp::Divide,
        POWER => BinaryOp::Power,
        _ => return None,
    };
    Some(op)
}

fn literal_kind(kind: SyntaxKind) -> Option<LiteralKind> {
    use SyntaxKind::*;
    let literal = match kind {
        STRING => LiteralKind::String,
        NUMBER => LiteralKind::Numeric,
        HEX => LiteralKind::Hex,
        DATE_LITERAL => LiteralKind::Date,
        TIME_LITERAL => LiteralKind::Time,
        TRUE | FALSE => LiteralKind::Boolean,
        _ => return None,
    };
    Some(literal)
}

impl Parser<'_, '_> {
    /// Full expression, including logical operators and comparisons.
    pub(in crate::parser) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.enter_nesting()?;
        let result = self.parse_binary(0);
        self.leave_nesting();
        result
    }

    fn parse_binary(&mut self, min_power: u8) -> ParseResult<Expression> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let kind = self.kind();
            let (Some(power), Some(op)) = (binary_binding_power(kind), binary_op(kind)) else {
                break;
            };
            if power.left < min_power {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(power.right)?;
            let range = lhs.range().cover(rhs.range());
            lhs = Expression::Binary(BinaryExpression {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                range,
            });
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        let (op, power) = match self.kind() {
            SyntaxKind::NOT => (UnaryOp::Not, NOT_BINDING_POWER),
            SyntaxKind::MINUS => (UnaryOp::Negate, SIGN_BINDING_POWER),
            SyntaxKind::PLUS => (UnaryOp::Plus, SIGN_BINDING_POWER),
            _ => return self.parse_primary(),
        };
        let start = self.advance().range.start();
        self.enter_nesting()?;
        let operand = self.parse_binary(power);
        self.leave_nesting();
        let operand = operand?;
        let range = TextRange::new(start, operand.range().end());
        Ok(Expression::Unary(UnaryExpression {
            op,
            operand: Box::new(operand),
            range,
        }))
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.kind() {
            SyntaxKind::LPAREN => {
                let start = self.advance().range.start();
                let inner = self.parse_expression()?;
                self.expect(SyntaxKind::RPAREN)?;
                Ok(Expression::Paren(ParenExpression {
                    inner: Box::new(inner),
                    range: self.finish(start),
                }))
            }
            SyntaxKind::IDENT if self.at_builtin_call() => {
                let name = identifier(&self.advance());
                let arguments = self.parse_argument_list()?;
                Ok(Expression::Function(FunctionCall {
                    range: self.finish(name.range.start()),
                    name,
                    arguments,
                }))
            }
            _ => Ok(Expression::Operand(self.parse_operand()?)),
        }
    }

    fn at_builtin_call(&self) -> bool {
        let text = self.current().text;
        self.peek_kind(1) == SyntaxKind::LPAREN
            && BUILTIN_FUNCTIONS
                .iter()
                .any(|builtin| builtin.eq_ignore_ascii_case(text))
    }

    /// `(expr, expr, …)`
    fn parse_argument_list(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(SyntaxKind::LPAREN)?;
        let mut arguments = vec![self.parse_expression()?];
        while self.eat(SyntaxKind::COMMA).is_some() {
            arguments.push(self.parse_expression()?);
        }
        self.expect(SyntaxKind::RPAREN)?;
        Ok(arguments)
    }

    /// Whether the current token can begin an operand.
    pub(in crate::parser) fn at_operand_start(&self) -> bool {
        let kind = self.kind();
        kind == SyntaxKind::IDENT
            || kind == SyntaxKind::SYSTEM_VARIABLE
            || literal_kind(kind).is_some()
            || (kind == SyntaxKind::MINUS
                && self.peek_kind(1) == SyntaxKind::NUMBER
                && self.adjacent(0))
    }

    /// A variable, system variable or literal.
    pub(in crate::parser) fn parse_operand(&mut self) -> ParseResult<Operand> {
        if self.at_next_statement() {
            return Err(self.unexpected("an operand"));
        }
        match self.kind() {
            SyntaxKind::IDENT => Ok(Operand::Variable(self.parse_variable_reference()?)),
            SyntaxKind::SYSTEM_VARIABLE => {
                Ok(Operand::SystemVariable(self.parse_system_variable()?))
            }
            SyntaxKind::MINUS if self.peek_kind(1) == SyntaxKind::NUMBER && self.adjacent(0) => {
                Ok(Operand::Literal(self.parse_literal()?))
            }
            kind if literal_kind(kind).is_some() => Ok(Operand::Literal(self.parse_literal()?)),
            _ => Err(self.unexpected("an operand")),
        }
    }

    /// A literal. A minus sign directly before a number becomes part of it.
    pub(in crate::parser) fn parse_literal(&mut self) -> ParseResult<Literal> {
        let sign = if self.at(SyntaxKind::MINUS) && self.peek_kind(1) == SyntaxKind::NUMBER {
            Some(self.advance())
        } else {
            None
        };
        let Some(kind) = literal_kind(self.kind()) else {
            return Err(self.unexpected("a literal"));
        };
        let token = self.advance();
        let (text, range) = match sign {
            Some(sign) => (
                SmolStr::new(format!("-{}", token.text)),
                sign.range.cover(token.range),
            ),
            None => (SmolStr::new(token.text), token.range),
        };
        Ok(Literal { kind, text, range })
    }

    fn parse_system_variable(&mut self) -> ParseResult<SystemVariable> {
        let token = self.expect(SyntaxKind::SYSTEM_VARIABLE)?;
        let mut label = None;
        let mut arguments = Vec::new();
        if self.at(SyntaxKind::LPAREN) && self.touches_previous() {
            if self.at_label_reference(1) {
                self.advance();
                label = Some(self.parse_label_reference());
                self.expect(SyntaxKind::RPAREN)?;
            } else {
                arguments = self.parse_argument_list()?;
            }
        }
        Ok(SystemVariable {
            name: SmolStr::new(token.text.to_ascii_uppercase()),
            label,
            arguments,
            range: self.finish(token.range.start()),
        })
    }

    /// `R1.` inside parentheses: a reference to a labelled statement.
    fn at_label_reference(&self, offset: usize) -> bool {
        self.peek_kind(offset) == SyntaxKind::IDENT
            && self.peek_kind(offset + 1) == SyntaxKind::DOT
            && self.adjacent(offset)
            && matches!(self.peek_kind(offset + 2), SyntaxKind::RPAREN | SyntaxKind::COMMA)
    }

    fn parse_label_reference(&mut self) -> Identifier {
        let label = identifier(&self.advance());
        self.advance();
        label
    }

    /// `#VAR`, `GRP.#VAR`, `#ARR(1)`, `#ARR(1:5)`, `#ARR(*)`.
    pub(in crate::parser) fn parse_variable_reference(&mut self) -> ParseResult<VariableReference> {
        let first = self.expect(SyntaxKind::IDENT)?;
        let start = first.range.start();

        let qualified = self.at(SyntaxKind::DOT)
            && self.peek_kind(1) == SyntaxKind::IDENT
            && self.touches_previous()
            && self.adjacent(0);
        let (qualifier, name) = if qualified {
            self.advance();
            let name = self.advance();
            (Some(identifier(&first)), identifier(&name))
        } else {
            (None, identifier(&first))
        };

        let subscripts = if self.at(SyntaxKind::LPAREN) && !self.at_attribute_list() {
            self.parse_subscripts()?
        } else {
            Vec::new()
        };

        Ok(VariableReference {
            qualifier,
            name,
            subscripts,
            resolved: None,
            range: self.finish(start),
        })
    }

    fn parse_subscripts(&mut self) -> ParseResult<Vec<Subscript>> {
        self.expect(SyntaxKind::LPAREN)?;
        let mut subscripts = Vec::new();
        loop {
            let subscript = if self.at_label_reference(0) {
                Subscript::Label(self.parse_label_reference())
            } else if self.at(SyntaxKind::ASTERISK)
                && matches!(self.peek_kind(1), SyntaxKind::COMMA | SyntaxKind::RPAREN)
            {
                Subscript::All(self.advance().range)
            } else {
                let from = self.parse_expression()?;
                if self.eat(SyntaxKind::COLON).is_some() {
                    let to = self.parse_expression()?;
                    Subscript::Range { from, to }
                } else {
                    Subscript::Index(from)
                }
            };
            subscripts.push(subscript);
            if self.eat(SyntaxKind::COMMA).is_none() {
                break;
            }
        }
        self.expect(SyntaxKind::RPAREN)?;
        Ok(subscripts)
    }
}
