//! Lexing and parsing of Natural source.
//!
//! [`parse`] is the entry point: it lexes the text, runs the recursive
//! descent parser and always returns a [`CompilationUnit`], together with
//! the lexical and syntax problems found on the way.
//!
//! ```
//! use natparse::parser::parse;
//! use natparse::syntax::ast::UnitKind;
//!
//! let parse = parse("#A := 1\nEND", UnitKind::Program);
//! assert!(parse.diagnostics.is_empty());
//! assert_eq!(parse.unit.body.len(), 2);
//! ```

mod grammar;
pub mod lexer;
#[allow(clippy::module_inception)]
mod parser;
pub mod syntax_kind;

use std::borrow::Cow;

pub use lexer::{LexError, Lexed, Token, lex};
pub use parser::SyntaxError;
pub use syntax_kind::{SyntaxKind, TokenCategory};

use crate::base::{LineIndex, TextRange};
use crate::syntax::ast::{CompilationUnit, UnitKind};
use parser::Parser;

/// Result of parsing one file.
#[derive(Clone, Debug)]
pub struct Parse {
    pub unit: CompilationUnit,
    pub lex_errors: Vec<LexError>,
    /// Syntax problems in the order they were found.
    pub diagnostics: Vec<SyntaxError>,
    pub comments: Vec<TextRange>,
    pub line_index: LineIndex,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !self.diagnostics.is_empty()
    }
}

/// Lex and parse a complete source text.
pub fn parse(text: &str, kind: UnitKind) -> Parse {
    let lexed = lex(text);
    let (unit, diagnostics) = parse_tokens(&lexed.tokens, kind);
    tracing::trace!(
        tokens = lexed.tokens.len(),
        lex_errors = lexed.errors.len(),
        syntax_errors = diagnostics.len(),
        "parsed compilation unit"
    );
    Parse {
        unit,
        lex_errors: lexed.errors,
        diagnostics,
        comments: lexed.comments,
        line_index: lexed.line_index,
    }
}

/// Parse an already lexed token sequence.
///
/// A trailing EOF token is added when the sequence lacks one.
pub fn parse_tokens(tokens: &[Token<'_>], kind: UnitKind) -> (CompilationUnit, Vec<SyntaxError>) {
    let tokens: Cow<'_, [Token<'_>]> = match tokens.last() {
        Some(last) if last.kind == SyntaxKind::EOF => Cow::Borrowed(tokens),
        last => {
            let mut owned = tokens.to_vec();
            let (range, line, column) = last.map_or((TextRange::default(), 0, 0), |t| {
                (TextRange::empty(t.range.end()), t.line, t.column + u32::from(t.range.len()))
            });
            owned.push(Token {
                kind: SyntaxKind::EOF,
                text: "",
                range,
                line,
                column,
            });
            Cow::Owned(owned)
        }
    };

    let mut parser = Parser::new(&tokens);
    let unit = parser.parse_compilation_unit(kind);
    (unit, parser.into_errors())
}
