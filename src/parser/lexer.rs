//! Lexer for Natural source text.
//!
//! Scanning happens in two layers. [`RawToken`] is a logos automaton that
//! only knows character classes. [`lex`] wraps it, mapping raw tokens to
//! [`SyntaxKind`]s, attaching line/column positions and applying the
//! rules that depend on where a token sits on its line:
//!
//! - `*` as the first non-blank character of a line, followed by a blank,
//!   another `*` or the end of the line, starts a comment.
//! - `/*` starts a comment anywhere, except in the array bound `(A10/*)`.
//!
//! The lexer never aborts. An invalid character is reported, skipped and
//! scanning resumes with the next character.

use logos::Logos;
use thiserror::Error;

use super::syntax_kind::SyntaxKind;
use crate::base::{LineCol, LineIndex, TextRange, TextSize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"/\*([^)\n][^\n]*)?")]
    InlineComment,
    /// `/*)` closing an unbounded array dimension.
    #[token("/*)")]
    UnboundedDimension,

    #[regex(r"[A-Za-z#&][A-Za-z0-9_#$@&\-]*")]
    Identifier,
    #[regex(r"\+[A-Za-z#][A-Za-z0-9_#$@&\-]*")]
    IndependentIdentifier,
    #[regex(r"\*[A-Za-z][A-Za-z0-9_\-]*")]
    SystemVariable,

    #[regex(r"'([^'\n]|'')*'")]
    #[regex(r#""([^"\n]|"")*""#)]
    String,
    #[regex(r"'([^'\n]|'')*")]
    #[regex(r#""([^"\n]|"")*"#)]
    UnterminatedString,
    #[regex(r"[Hh]'[0-9A-Fa-f]*'")]
    Hex,
    #[regex(r"[Dd]'[^'\n]*'")]
    Date,
    #[regex(r"[Tt]'[^'\n]*'")]
    Time,
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,
    #[regex(r"[0-9]+[Xx]")]
    Spacing,
    #[regex(r"[0-9]+[Tt]")]
    Tabulation,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Equals,
    #[token("<>")]
    #[token("^=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token(":=")]
    ColonEquals,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("**")]
    Power,
    #[token("/")]
    Slash,
}

/// A classified token with its exact source position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token<'src> {
    pub kind: SyntaxKind,
    pub text: &'src str,
    pub range: TextRange,
    /// 0-indexed line of the token start.
    pub line: u32,
    /// 0-indexed byte column of the token start.
    pub column: u32,
}

impl Token<'_> {
    /// Byte offset of the token start.
    #[inline]
    pub fn offset(&self) -> TextSize {
        self.range.start()
    }

    #[inline]
    pub fn position(&self) -> LineCol {
        LineCol::new(self.line, self.column)
    }
}

/// A recoverable lexical problem.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated literal starting at {position}")]
    UnterminatedLiteral { range: TextRange, position: LineCol },

    #[error("invalid character {character:?} at {position}")]
    InvalidCharacter {
        character: char,
        range: TextRange,
        position: LineCol,
    },

    #[error(
        "non-ASCII identifier character {character:?} at {position}; \
         Natural names are ASCII only"
    )]
    NonAsciiIdentifier {
        character: char,
        range: TextRange,
        position: LineCol,
    },
}

impl LexError {
    pub fn range(&self) -> TextRange {
        match self {
            LexError::UnterminatedLiteral { range, .. }
            | LexError::InvalidCharacter { range, .. }
            | LexError::NonAsciiIdentifier { range, .. } => *range,
        }
    }
}

/// Output of [`lex`].
#[derive(Clone, Debug)]
pub struct Lexed<'src> {
    /// Tokens in source order; the last one is always [`SyntaxKind::EOF`].
    pub tokens: Vec<Token<'src>>,
    pub errors: Vec<LexError>,
    /// Ranges of line and inline comments, which are not tokens.
    pub comments: Vec<TextRange>,
    pub line_index: LineIndex,
}

/// Lex a complete source text.
pub fn lex(text: &str) -> Lexed<'_> {
    let line_index = LineIndex::new(text);
    let mut lexed = Lexed {
        tokens: Vec::new(),
        errors: Vec::new(),
        comments: Vec::new(),
        line_index,
    };

    let mut raw = RawToken::lexer(text);
    while let Some(result) = raw.next() {
        let span = raw.span();
        let range = text_range(span.start, span.end);

        let raw_token = match result {
            Ok(token) => token,
            Err(()) => {
                lexed.report_invalid(text, range);
                continue;
            }
        };

        let kind = match raw_token {
            RawToken::InlineComment => {
                lexed.comments.push(range);
                continue;
            }
            RawToken::Asterisk | RawToken::Power
                if starts_line_comment(text, span.start, span.end) =>
            {
                let eol = text[span.end..]
                    .find('\n')
                    .map_or(text.len(), |idx| span.end + idx);
                raw.bump(eol - span.end);
                lexed.comments.push(text_range(span.start, eol));
                continue;
            }
            RawToken::UnboundedDimension => {
                let start = span.start;
                lexed.push(text, SyntaxKind::SLASH, start, start + 1);
                lexed.push(text, SyntaxKind::ASTERISK, start + 1, start + 2);
                lexed.push(text, SyntaxKind::RPAREN, start + 2, start + 3);
                continue;
            }
            RawToken::UnterminatedString => {
                let position = lexed.line_index.line_col(range.start());
                lexed
                    .errors
                    .push(LexError::UnterminatedLiteral { range, position });
                SyntaxKind::UNTERMINATED_STRING
            }
            RawToken::Identifier => {
                SyntaxKind::from_keyword(raw.slice()).unwrap_or(SyntaxKind::IDENT)
            }
            RawToken::IndependentIdentifier => SyntaxKind::IDENT,
            RawToken::SystemVariable => SyntaxKind::SYSTEM_VARIABLE,
            RawToken::String => SyntaxKind::STRING,
            RawToken::Hex => SyntaxKind::HEX,
            RawToken::Date => SyntaxKind::DATE_LITERAL,
            RawToken::Time => SyntaxKind::TIME_LITERAL,
            RawToken::Number => SyntaxKind::NUMBER,
            RawToken::Spacing => SyntaxKind::SPACING,
            RawToken::Tabulation => SyntaxKind::TABULATION,
            RawToken::LParen => SyntaxKind::LPAREN,
            RawToken::RParen => SyntaxKind::RPAREN,
            RawToken::Comma => SyntaxKind::COMMA,
            RawToken::Dot => SyntaxKind::DOT,
            RawToken::Colon => SyntaxKind::COLON,
            RawToken::Semicolon => SyntaxKind::SEMICOLON,
            RawToken::Equals => SyntaxKind::EQUALS,
            RawToken::NotEqual => SyntaxKind::NOT_EQUAL,
            RawToken::Less => SyntaxKind::LESS,
            RawToken::LessEqual => SyntaxKind::LESS_EQUAL,
            RawToken::Greater => SyntaxKind::GREATER,
            RawToken::GreaterEqual => SyntaxKind::GREATER_EQUAL,
            RawToken::ColonEquals => SyntaxKind::COLON_EQUALS,
            RawToken::Plus => SyntaxKind::PLUS,
            RawToken::Minus => SyntaxKind::MINUS,
            RawToken::Asterisk => SyntaxKind::ASTERISK,
            RawToken::Power => SyntaxKind::POWER,
            RawToken::Slash => SyntaxKind::SLASH,
        };
        lexed.push(text, kind, span.start, span.end);
    }

    lexed.push(text, SyntaxKind::EOF, text.len(), text.len());
    lexed
}

impl<'src> Lexed<'src> {
    fn push(&mut self, text: &'src str, kind: SyntaxKind, start: usize, end: usize) {
        let range = text_range(start, end);
        let position = self.line_index.line_col(range.start());
        self.tokens.push(Token {
            kind,
            text: &text[start..end],
            range,
            line: position.line,
            column: position.col,
        });
    }

    fn report_invalid(&mut self, text: &str, range: TextRange) {
        let position = self.line_index.line_col(range.start());
        let start = usize::from(range.start());
        let Some(character) = text.get(start..).and_then(|rest| rest.chars().next()) else {
            return;
        };
        let error = if !character.is_ascii()
            && (unicode_ident::is_xid_start(character) || unicode_ident::is_xid_continue(character))
        {
            LexError::NonAsciiIdentifier {
                character,
                range,
                position,
            }
        } else {
            LexError::InvalidCharacter {
                character,
                range,
                position,
            }
        };
        tracing::trace!(%position, ?character, "skipping invalid character");
        self.errors.push(error);
    }

    /// Whether any lexical error was reported.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// `*`/`**` starting a line comment: first non-blank on its line and, for a
/// single `*`, followed by a blank or the end of the line.
fn starts_line_comment(text: &str, start: usize, end: usize) -> bool {
    let line_start = text[..start].rfind('\n').map_or(0, |idx| idx + 1);
    let only_blanks_before = text[line_start..start]
        .bytes()
        .all(|b| b == b' ' || b == b'\t');
    if !only_blanks_before {
        return false;
    }
    if end - start == 2 {
        return true;
    }
    matches!(
        text.as_bytes().get(end),
        None | Some(b' ' | b'\t' | b'\r' | b'\n' | b'*')
    )
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        lex(text).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_statement_tokens() {
        assert_eq!(
            kinds("MOVE 'A' TO #VAR"),
            vec![
                SyntaxKind::MOVE,
                SyntaxKind::STRING,
                SyntaxKind::TO,
                SyntaxKind::IDENT,
                SyntaxKind::EOF
            ]
        );
    }

    #[test]
    fn test_positions_are_exact() {
        let lexed = lex("WRITE\n  #A");
        let ident = lexed.tokens[1];
        assert_eq!(ident.text, "#A");
        assert_eq!((ident.line, ident.column), (1, 2));
        assert_eq!(u32::from(ident.offset()), 8);
    }

    #[rstest]
    #[case("* a comment\nEND", vec![SyntaxKind::END, SyntaxKind::EOF])]
    #[case("** banner\nEND", vec![SyntaxKind::END, SyntaxKind::EOF])]
    #[case("  *\nEND", vec![SyntaxKind::END, SyntaxKind::EOF])]
    #[case("END /* trailing", vec![SyntaxKind::END, SyntaxKind::EOF])]
    fn test_comments_are_skipped(#[case] text: &str, #[case] expected: Vec<SyntaxKind>) {
        let lexed = lex(text);
        assert_eq!(lexed.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(), expected);
        assert_eq!(lexed.comments.len(), 1);
    }

    #[test]
    fn test_asterisk_inside_line_is_operator() {
        assert_eq!(
            kinds("#A := #B * 2"),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::COLON_EQUALS,
                SyntaxKind::IDENT,
                SyntaxKind::ASTERISK,
                SyntaxKind::NUMBER,
                SyntaxKind::EOF
            ]
        );
    }

    #[test]
    fn test_unbounded_dimension_is_not_a_comment() {
        assert_eq!(
            kinds("1 #ARR (A10/*)"),
            vec![
                SyntaxKind::NUMBER,
                SyntaxKind::IDENT,
                SyntaxKind::LPAREN,
                SyntaxKind::IDENT,
                SyntaxKind::SLASH,
                SyntaxKind::ASTERISK,
                SyntaxKind::RPAREN,
                SyntaxKind::EOF
            ]
        );
    }

    #[rstest]
    #[case("*DATX", SyntaxKind::SYSTEM_VARIABLE)]
    #[case("+IND", SyntaxKind::IDENT)]
    #[case("H'0F'", SyntaxKind::HEX)]
    #[case("D'2024-01-01'", SyntaxKind::DATE_LITERAL)]
    #[case("T'12:00'", SyntaxKind::TIME_LITERAL)]
    #[case("'it''s'", SyntaxKind::STRING)]
    #[case("\"double\"", SyntaxKind::STRING)]
    #[case("12.50", SyntaxKind::NUMBER)]
    #[case("5X", SyntaxKind::SPACING)]
    #[case("10T", SyntaxKind::TABULATION)]
    #[case("<>", SyntaxKind::NOT_EQUAL)]
    #[case("#GRP-NAME", SyntaxKind::IDENT)]
    fn test_single_token(#[case] text: &str, #[case] expected: SyntaxKind) {
        let lexed = lex(text);
        assert_eq!(lexed.tokens.len(), 2, "{:?}", lexed.tokens);
        assert_eq!(lexed.tokens[0].kind, expected);
        assert_eq!(lexed.tokens[0].text, text);
    }

    #[test]
    fn test_unterminated_string_is_reported() {
        let lexed = lex("WRITE 'oops\nEND");
        assert_eq!(lexed.tokens[1].kind, SyntaxKind::UNTERMINATED_STRING);
        assert_eq!(lexed.tokens[2].kind, SyntaxKind::END);
        assert!(matches!(
            lexed.errors.as_slice(),
            [LexError::UnterminatedLiteral { .. }]
        ));
    }

    #[test]
    fn test_invalid_character_recovers() {
        let lexed = lex("WRITE ! #A");
        assert_eq!(
            lexed.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![SyntaxKind::WRITE, SyntaxKind::IDENT, SyntaxKind::EOF]
        );
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(u32::from(lexed.errors[0].range().start()), 6);
        assert_eq!(lexed.tokens[1].column, 8);
    }

    #[test]
    fn test_non_ascii_letter_reported_as_identifier_problem() {
        let lexed = lex("#ä");
        assert!(matches!(
            lexed.errors.first(),
            Some(LexError::NonAsciiIdentifier { character: 'ä', .. })
        ));
    }

    #[test]
    fn test_lexing_is_deterministic() {
        let text = "DEFINE DATA LOCAL\n1 #A (N7,2)\nEND-DEFINE\n#A := 1,5 ! 'x\nEND";
        assert_eq!(lex(text).tokens, lex(text).tokens);
        assert_eq!(lex(text).errors, lex(text).errors);
    }
}
