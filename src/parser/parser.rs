//! Parser state and token-level primitives.
//!
//! The grammar productions live in [`super::grammar`] as further `impl`
//! blocks on [`Parser`]. Everything here is about moving through the token
//! slice, looking ahead without consuming, and recovering from errors.

use thiserror::Error;

use super::lexer::Token;
use super::syntax_kind::SyntaxKind;
use crate::base::{TextRange, TextSize};
use crate::syntax::ast::ErrorNode;

/// Maximum nesting of expressions and blocks before the parser bails out.
///
/// Deeply nested input would otherwise overflow the stack.
pub(super) const MAX_NESTING_DEPTH: usize = 64;

/// A syntax problem found while parsing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

pub(super) type ParseResult<T> = Result<T, SyntaxError>;

/// Binding power for binary operators (Pratt parsing).
///
/// Left-associative operators have `left < right`, right-associative ones
/// `left > right`.
#[derive(Debug, Clone, Copy)]
pub(super) struct BindingPower {
    pub(super) left: u8,
    pub(super) right: u8,
}

impl BindingPower {
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }

    const fn right_assoc(precedence: u8) -> Self {
        Self {
            left: precedence + 1,
            right: precedence,
        }
    }
}

/// Binding power of a binary operator token.
///
/// | Level | Operators | Associativity |
/// |-------|-----------|---------------|
/// | 10 | `OR` | Left |
/// | 20 | `AND` | Left |
/// | 40 | `= <> < <= > >=` and `EQ NE LT LE GT GE` | Left |
/// | 50 | `+ -` | Left |
/// | 60 | `* /` | Left |
/// | 70 | `**` | Right |
///
/// `NOT` sits at level 30 as a prefix operator and is handled separately.
pub(super) fn binary_binding_power(kind: SyntaxKind) -> Option<BindingPower> {
    use SyntaxKind::*;
    match kind {
        OR => Some(BindingPower::left_assoc(10)),
        AND => Some(BindingPower::left_assoc(20)),
        EQUALS | NOT_EQUAL | LESS | LESS_EQUAL | GREATER | GREATER_EQUAL | EQ | NE | LT | LE
        | GT | GE => Some(BindingPower::left_assoc(40)),
        PLUS | MINUS => Some(BindingPower::left_assoc(50)),
        ASTERISK | SLASH => Some(BindingPower::left_assoc(60)),
        POWER => Some(BindingPower::right_assoc(70)),
        _ => None,
    }
}

/// Right binding power of prefix `NOT`.
pub(super) const NOT_BINDING_POWER: u8 = 30;
/// Right binding power of unary sign; tighter than any binary operator.
pub(super) const SIGN_BINDING_POWER: u8 = 80;

pub(crate) struct Parser<'t, 'src> {
    tokens: &'t [Token<'src>],
    /// Index of the current token.
    pos: usize,
    /// Non-fatal problems reported while productions carry on.
    pub(super) errors: Vec<SyntaxError>,
    /// Nesting of expressions and statement blocks.
    nesting_depth: usize,
    /// Number of enclosing block statements; `END-xxx` only stops nested lists.
    pub(super) block_depth: usize,
}

impl<'t, 'src> Parser<'t, 'src> {
    /// `tokens` must end with [`SyntaxKind::EOF`].
    pub(crate) fn new(tokens: &'t [Token<'src>]) -> Self {
        debug_assert!(matches!(tokens.last(), Some(t) if t.kind == SyntaxKind::EOF));
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            nesting_depth: 0,
            block_depth: 0,
        }
    }

    pub(crate) fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Token at an absolute index, clamped to the trailing EOF.
    fn token_at(&self, index: usize) -> &Token<'src> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[index.min(last)]
    }

    pub(super) fn current(&self) -> &Token<'src> {
        self.token_at(self.pos)
    }

    pub(super) fn kind(&self) -> SyntaxKind {
        self.current().kind
    }

    /// Looks `offset` tokens ahead without consuming.
    pub(super) fn peek(&self, offset: usize) -> &Token<'src> {
        self.token_at(self.pos + offset)
    }

    pub(super) fn peek_kind(&self, offset: usize) -> SyntaxKind {
        self.peek(offset).kind
    }

    pub(super) fn position(&self) -> usize {
        self.pos
    }

    /// Start offset of the token at an absolute index.
    pub(super) fn offset_of(&self, index: usize) -> TextSize {
        self.token_at(index).range.start()
    }

    pub(super) fn at(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    pub(super) fn at_end(&self) -> bool {
        self.at(SyntaxKind::EOF)
    }

    /// Consumes the current token. Never moves past EOF.
    pub(super) fn advance(&mut self) -> Token<'src> {
        let token = *self.current();
        if token.kind != SyntaxKind::EOF {
            self.pos += 1;
        }
        token
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> Option<Token<'src>> {
        self.at(kind).then(|| self.advance())
    }

    pub(super) fn expect(&mut self, kind: SyntaxKind) -> ParseResult<Token<'src>> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Expects a name: an identifier, or inside `DEFINE DATA` a soft keyword.
    pub(super) fn expect_name(&mut self, allow_soft_keywords: bool) -> ParseResult<Token<'src>> {
        let kind = self.kind();
        if kind == SyntaxKind::IDENT || (allow_soft_keywords && kind.can_be_name()) {
            Ok(self.advance())
        } else {
            Err(self.unexpected("a name"))
        }
    }

    /// End offset of the last consumed token.
    fn previous_end(&self) -> TextSize {
        if self.pos == 0 {
            return self.current().range.start();
        }
        self.tokens[self.pos - 1].range.end()
    }

    /// Range from `start` to the end of the last consumed token.
    pub(super) fn finish(&self, start: TextSize) -> TextRange {
        TextRange::new(start, self.previous_end().max(start))
    }

    /// Whether the token at `offset` starts its line.
    pub(super) fn is_first_on_line(&self, offset: usize) -> bool {
        let index = self.pos + offset;
        if index == 0 {
            return true;
        }
        let token = self.token_at(index);
        let previous = self.token_at(index - 1);
        token.line > previous.line
    }

    /// Whether the tokens at `offset` and `offset + 1` touch.
    pub(super) fn adjacent(&self, offset: usize) -> bool {
        let first = self.peek(offset);
        let second = self.peek(offset + 1);
        first.range.end() == second.range.start()
    }

    /// Whether the current token touches the one consumed before it.
    pub(super) fn touches_previous(&self) -> bool {
        self.pos > 0 && self.previous_end() == self.current().range.start()
    }

    // ========================================================================
    // Lookahead predicates
    // ========================================================================

    /// `(AD=…`: an attribute list rather than a subscript.
    pub(super) fn at_attribute_list(&self) -> bool {
        self.at(SyntaxKind::LPAREN)
            && self.peek_kind(1) == SyntaxKind::IDENT
            && self.peek(1).text.len() == 2
            && self.peek_kind(2) == SyntaxKind::EQUALS
    }

    /// `R1. READ …`: a statement label.
    pub(super) fn at_label(&self) -> bool {
        self.at(SyntaxKind::IDENT)
            && self.peek_kind(1) == SyntaxKind::DOT
            && self.adjacent(0)
            && matches!(
                self.peek_kind(2),
                SyntaxKind::READ | SyntaxKind::FIND | SyntaxKind::FOR | SyntaxKind::REPEAT
            )
    }

    /// `#A := …`, `GRP.#A := …` or `#ARR(1) := …` ahead.
    pub(super) fn at_assignment_start(&self) -> bool {
        if !self.at(SyntaxKind::IDENT) {
            return false;
        }
        let mut offset = 1;
        if self.peek_kind(offset) == SyntaxKind::DOT
            && self.peek_kind(offset + 1) == SyntaxKind::IDENT
        {
            offset += 2;
        }
        if self.peek_kind(offset) == SyntaxKind::LPAREN {
            let mut depth = 0usize;
            loop {
                match self.peek_kind(offset) {
                    SyntaxKind::LPAREN => depth += 1,
                    SyntaxKind::RPAREN => {
                        depth -= 1;
                        if depth == 0 {
                            offset += 1;
                            break;
                        }
                    }
                    SyntaxKind::EOF => return false,
                    _ => {}
                }
                offset += 1;
                if offset > MAX_NESTING_DEPTH * 4 {
                    return false;
                }
            }
        }
        self.peek_kind(offset) == SyntaxKind::COLON_EQUALS
    }

    /// A new line opens an assignment or a labelled loop, so whatever the
    /// current statement still needs is missing.
    pub(super) fn at_next_statement(&self) -> bool {
        self.is_first_on_line(0) && (self.at_assignment_start() || self.at_label())
    }

    /// Statement boundary for recovery and for open-ended element lists.
    pub(super) fn at_boundary(&self) -> bool {
        let kind = self.kind();
        kind == SyntaxKind::EOF
            || kind.closes_block()
            || ((kind.starts_statement() || kind.separates_block()) && self.is_first_on_line(0))
            || self.at_next_statement()
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// "expected X, found Y" at the current token.
    pub(super) fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        let found = match token.kind {
            SyntaxKind::EOF => "end of input".to_string(),
            kind if kind.is_keyword() => format!("'{}'", kind.describe()),
            _ => format!("'{}'", token.text),
        };
        SyntaxError::new(format!("expected {expected}, found {found}"), token.range)
    }

    /// Records a problem the production can carry on from.
    pub(super) fn report(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    pub(super) fn enter_nesting(&mut self) -> ParseResult<()> {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::new(
                format!("nesting is too deep (maximum {MAX_NESTING_DEPTH} levels)"),
                self.current().range,
            ));
        }
        self.nesting_depth += 1;
        Ok(())
    }

    pub(super) fn leave_nesting(&mut self) {
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    /// Discards tokens from a failed statement up to the next boundary.
    ///
    /// At least one token is consumed overall, counting the ones the failed
    /// production already took. The returned node covers the statement
    /// start through the last discarded token; a diagnostic with the same
    /// range is recorded.
    pub(super) fn recover(&mut self, start_pos: usize, error: SyntaxError) -> ErrorNode {
        if self.pos == start_pos {
            self.advance();
        }
        while !self.at_boundary() {
            self.advance();
        }
        let range = self.finish(self.offset_of(start_pos));
        tracing::trace!(?range, message = %error.message, "recovered from syntax error");
        self.errors.push(SyntaxError::new(error.message, range));
        ErrorNode { range }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;

    #[test]
    fn test_peek_and_advance_stop_at_eof() {
        let lexed = lex("END");
        let mut parser = Parser::new(&lexed.tokens);
        assert_eq!(parser.kind(), SyntaxKind::END);
        assert_eq!(parser.peek_kind(5), SyntaxKind::EOF);
        parser.advance();
        parser.advance();
        parser.advance();
        assert!(parser.at_end());
    }

    #[test]
    fn test_first_on_line_and_adjacency() {
        let lexed = lex("WRITE #A\nR1. READ EMP");
        let mut parser = Parser::new(&lexed.tokens);
        assert!(parser.is_first_on_line(0));
        assert!(!parser.is_first_on_line(1));
        parser.advance();
        parser.advance();
        assert!(parser.is_first_on_line(0));
        assert!(parser.adjacent(0));
        assert!(parser.at_label());
    }

    #[test]
    fn test_assignment_lookahead_skips_subscripts() {
        let lexed = lex("#ARR(#I + (1)) := 5");
        let parser = Parser::new(&lexed.tokens);
        assert!(parser.at_assignment_start());

        let lexed = lex("#ARR(1) 5");
        let parser = Parser::new(&lexed.tokens);
        assert!(!parser.at_assignment_start());
    }

    #[test]
    fn test_binding_powers_follow_precedence() {
        let or = binary_binding_power(SyntaxKind::OR).map(|bp| bp.left);
        let and = binary_binding_power(SyntaxKind::AND).map(|bp| bp.left);
        let plus = binary_binding_power(SyntaxKind::PLUS).map(|bp| bp.left);
        let times = binary_binding_power(SyntaxKind::ASTERISK).map(|bp| bp.left);
        assert!(or < and && and < plus && plus < times);
        let power = binary_binding_power(SyntaxKind::POWER);
        assert!(matches!(power, Some(bp) if bp.left > bp.right));
        assert!(binary_binding_power(SyntaxKind::TO).is_none());
    }
}
