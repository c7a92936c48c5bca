//! Diagnostics: findings from every pipeline stage.
//!
//! Lexer, parser, resolver and analyzers all report through [`Diagnostic`].
//! A diagnostic is never changed once it has been created.

use std::fmt;
use std::sync::Arc;

use crate::base::{FileId, LineCol, LineIndex, TextRange};
use crate::parser::{LexError, SyntaxError};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Most severe first, so sorting puts errors on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// The stage that produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticOrigin {
    Lexer,
    Parser,
    Resolver,
    /// A registered analyzer, by id.
    Analyzer(&'static str),
    /// The analyzer framework itself.
    Framework,
}

impl fmt::Display for DiagnosticOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticOrigin::Lexer => f.write_str("lexer"),
            DiagnosticOrigin::Parser => f.write_str("parser"),
            DiagnosticOrigin::Resolver => f.write_str("resolver"),
            DiagnosticOrigin::Analyzer(id) => f.write_str(id),
            DiagnosticOrigin::Framework => f.write_str("framework"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FileId,
    pub range: TextRange,
    pub severity: Severity,
    /// Stable code, e.g. `E-UNRESOLVED` or an analyzer id.
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub origin: DiagnosticOrigin,
    /// Other places involved, such as a previous definition.
    pub related: Vec<RelatedInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub file: FileId,
    pub range: TextRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn new(
        file: FileId,
        range: TextRange,
        severity: Severity,
        origin: DiagnosticOrigin,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            file,
            range,
            severity,
            code: None,
            message: message.into(),
            origin,
            related: Vec::new(),
        }
    }

    pub fn error(
        file: FileId,
        range: TextRange,
        origin: DiagnosticOrigin,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self::new(file, range, Severity::Error, origin, message)
    }

    pub fn warning(
        file: FileId,
        range: TextRange,
        origin: DiagnosticOrigin,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self::new(file, range, Severity::Warning, origin, message)
    }

    pub fn from_lex_error(file: FileId, error: &LexError) -> Self {
        let code = match error {
            LexError::UnterminatedLiteral { .. } => codes::UNTERMINATED_LITERAL,
            LexError::InvalidCharacter { .. } | LexError::NonAsciiIdentifier { .. } => {
                codes::INVALID_CHARACTER
            }
        };
        Self::error(file, error.range(), DiagnosticOrigin::Lexer, error.to_string()).with_code(code)
    }

    pub fn from_syntax_error(file: FileId, error: &SyntaxError) -> Self {
        Self::error(file, error.range, DiagnosticOrigin::Parser, error.message.as_str())
            .with_code(codes::SYNTAX_ERROR)
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// 0-indexed start and end positions.
    pub fn line_cols(&self, index: &LineIndex) -> (LineCol, LineCol) {
        index.range_line_cols(self.range)
    }
}

/// `error[E-UNRESOLVED]: undefined variable '#X'`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}[{code}]: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Codes for diagnostics raised by the core pipeline.
///
/// Analyzer findings use the analyzer id as their code.
pub mod codes {
    pub const INVALID_CHARACTER: &str = "E-LEX-CHARACTER";
    pub const UNTERMINATED_LITERAL: &str = "E-LEX-UNTERMINATED";
    pub const SYNTAX_ERROR: &str = "E-SYNTAX";

    /// A scope keyword outside the scope mapping's domain.
    pub const SCOPE_UNMAPPED: &str = "E-SCOPE-UNMAPPED";
    pub const DUPLICATE_DEFINITION: &str = "E-DUPLICATE";
    /// Same name declared in two different scopes.
    pub const SCOPE_TRANSITION: &str = "E-SCOPE-TRANSITION";
    /// `+` prefix used outside INDEPENDENT, or missing inside it.
    pub const INDEPENDENT_NAMING: &str = "E-INDEPENDENT-NAME";
    pub const USING_KIND_MISMATCH: &str = "E-USING-KIND";
    pub const USING_NOT_FOUND: &str = "W-USING-NOT-FOUND";
    pub const DDM_NOT_FOUND: &str = "W-DDM-NOT-FOUND";
    pub const UNKNOWN_VIEW_FIELD: &str = "E-VIEW-FIELD";
    pub const UNDEFINED_REFERENCE: &str = "E-UNRESOLVED";
    pub const AMBIGUOUS_REFERENCE: &str = "E-AMBIGUOUS";

    pub const ANALYZER_FAILED: &str = "E-ANALYZER-FAILED";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;
    use crate::parser::lex;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn test_display_includes_code() {
        let diag = Diagnostic::error(
            FileId::new(0),
            range(0, 1),
            DiagnosticOrigin::Resolver,
            "undefined variable '#X'",
        )
        .with_code(codes::UNDEFINED_REFERENCE);
        assert_eq!(diag.to_string(), "error[E-UNRESOLVED]: undefined variable '#X'");
        assert!(diag.is_error());

        let plain =
            Diagnostic::warning(FileId::new(0), range(0, 1), DiagnosticOrigin::Parser, "odd");
        assert_eq!(plain.to_string(), "warning: odd");
    }

    #[test]
    fn test_severity_sorts_errors_first() {
        let mut severities = vec![Severity::Info, Severity::Error, Severity::Warning];
        severities.sort();
        assert_eq!(severities, [Severity::Error, Severity::Warning, Severity::Info]);
    }

    #[test]
    fn test_from_lex_error_codes() {
        let lexed = lex("WRITE 'open\n!");
        let codes: Vec<_> = lexed
            .errors
            .iter()
            .map(|e| Diagnostic::from_lex_error(FileId::new(1), e))
            .map(|d| (d.origin, d.code))
            .collect();
        assert_eq!(
            codes,
            [
                (DiagnosticOrigin::Lexer, Some(Arc::from(codes::UNTERMINATED_LITERAL))),
                (DiagnosticOrigin::Lexer, Some(Arc::from(codes::INVALID_CHARACTER))),
            ]
        );
    }

    #[test]
    fn test_from_syntax_error_keeps_range() {
        let error = SyntaxError::new("expected a statement, found 'TO'", range(4, 6));
        let diag = Diagnostic::from_syntax_error(FileId::new(3), &error);
        assert_eq!(diag.range, range(4, 6));
        assert_eq!(diag.origin, DiagnosticOrigin::Parser);
        assert_eq!(&*diag.message, "expected a statement, found 'TO'");
    }

    #[test]
    fn test_line_cols() {
        let index = LineIndex::new("WRITE\n  #A");
        let diag = Diagnostic::error(FileId::new(0), range(8, 10), DiagnosticOrigin::Resolver, "x");
        assert_eq!(diag.line_cols(&index), (LineCol::new(1, 2), LineCol::new(1, 4)));
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(DiagnosticOrigin::Analyzer("empty-body").to_string(), "empty-body");
        assert_eq!(DiagnosticOrigin::Framework.to_string(), "framework");
    }
}
