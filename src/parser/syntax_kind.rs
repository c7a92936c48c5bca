//! The closed vocabulary of token kinds shared by the lexer and parser.
//!
//! Every classification below is an exhaustive `match` without a wildcard
//! arm: adding a kind does not compile until each one has been updated.

use std::fmt;

/// Kind of a lexed token.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // Markers
    EOF,
    UNTERMINATED_STRING,

    // Literals and names
    IDENT,
    SYSTEM_VARIABLE,
    STRING,
    NUMBER,
    HEX,
    DATE_LITERAL,
    TIME_LITERAL,
    SPACING,
    TABULATION,

    // Punctuation
    LPAREN,
    RPAREN,
    COMMA,
    DOT,
    COLON,
    SEMICOLON,

    // Operators
    EQUALS,
    NOT_EQUAL,
    LESS,
    LESS_EQUAL,
    GREATER,
    GREATER_EQUAL,
    COLON_EQUALS,
    PLUS,
    MINUS,
    ASTERISK,
    SLASH,
    POWER,

    // Scope keywords
    LOCAL,
    GLOBAL,
    PARAMETER,
    INDEPENDENT,

    // Keywords
    ADD,
    ALL,
    AND,
    ANY,
    ASSIGN,
    AT,
    BOTTOM,
    BY,
    CALLNAT,
    COMPRESS,
    COMPUTE,
    CONDITION,
    CONST,
    DATA,
    DECIDE,
    DEFINE,
    DISPLAY,
    DIVIDE,
    DYNAMIC,
    ELSE,
    END,
    END_DECIDE,
    END_DEFINE,
    END_FIND,
    END_FOR,
    END_IF,
    END_READ,
    END_REPEAT,
    END_SUBROUTINE,
    ENDING,
    EQ,
    ESCAPE,
    EVERY,
    FALSE,
    FETCH,
    FIND,
    FIRST,
    FOR,
    FROM,
    GE,
    GIVING,
    GT,
    IF,
    IGNORE,
    INCLUDE,
    INIT,
    INITIAL,
    INPUT,
    INTO,
    LE,
    LEAVING,
    LOGICAL,
    LT,
    MAP,
    MODULE,
    MOVE,
    MULTIPLY,
    NE,
    NO,
    NOHDR,
    NONE,
    NOT,
    NOTITLE,
    OF,
    ON,
    OPTIONAL,
    OR,
    PERFORM,
    PHYSICAL,
    PRINT,
    READ,
    REDEFINE,
    REPEAT,
    RESET,
    RESULT,
    RETURN,
    ROUNDED,
    ROUTINE,
    SPACE,
    STARTING,
    STEP,
    STOP,
    SUBROUTINE,
    SUBTRACT,
    THEN,
    THRU,
    TO,
    TOP,
    TRUE,
    UNTIL,
    USING,
    VALUE,
    VIEW,
    WHEN,
    WHERE,
    WHILE,
    WITH,
    WRITE,
}

/// Coarse classification of a [`SyntaxKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Marker,
    Literal,
    Name,
    Punctuation,
    Operator,
    ScopeKeyword,
    Keyword,
}

impl SyntaxKind {
    /// Look up a keyword by its source text (case-insensitive).
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        use SyntaxKind::*;
        let upper = text.to_ascii_uppercase();
        let kind = match upper.as_str() {
            "LOCAL" => LOCAL,
            "GLOBAL" => GLOBAL,
            "PARAMETER" => PARAMETER,
            "INDEPENDENT" => INDEPENDENT,
            "ADD" => ADD,
            "ALL" => ALL,
            "AND" => AND,
            "ANY" => ANY,
            "ASSIGN" => ASSIGN,
            "AT" => AT,
            "BOTTOM" => BOTTOM,
            "BY" => BY,
            "CALLNAT" => CALLNAT,
            "COMPRESS" => COMPRESS,
            "COMPUTE" => COMPUTE,
            "CONDITION" => CONDITION,
            "CONST" => CONST,
            "DATA" => DATA,
            "DECIDE" => DECIDE,
            "DEFINE" => DEFINE,
            "DISPLAY" => DISPLAY,
            "DIVIDE" => DIVIDE,
            "DYNAMIC" => DYNAMIC,
            "ELSE" => ELSE,
            "END" => END,
            "END-DECIDE" => END_DECIDE,
            "END-DEFINE" => END_DEFINE,
            "END-FIND" => END_FIND,
            "END-FOR" => END_FOR,
            "END-IF" => END_IF,
            "END-READ" => END_READ,
            "END-REPEAT" => END_REPEAT,
            "END-SUBROUTINE" => END_SUBROUTINE,
            "ENDING" => ENDING,
            "EQ" => EQ,
            "ESCAPE" => ESCAPE,
            "EVERY" => EVERY,
            "FALSE" => FALSE,
            "FETCH" => FETCH,
            "FIND" => FIND,
            "FIRST" => FIRST,
            "FOR" => FOR,
            "FROM" => FROM,
            "GE" => GE,
            "GIVING" => GIVING,
            "GT" => GT,
            "IF" => IF,
            "IGNORE" => IGNORE,
            "INCLUDE" => INCLUDE,
            "INIT" => INIT,
            "INITIAL" => INITIAL,
            "INPUT" => INPUT,
            "INTO" => INTO,
            "LE" => LE,
            "LEAVING" => LEAVING,
            "LOGICAL" => LOGICAL,
            "LT" => LT,
            "MAP" => MAP,
            "MODULE" => MODULE,
            "MOVE" => MOVE,
            "MULTIPLY" => MULTIPLY,
            "NE" => NE,
            "NO" => NO,
            "NOHDR" => NOHDR,
            "NONE" => NONE,
            "NOT" => NOT,
            "NOTITLE" => NOTITLE,
            "OF" => OF,
            "ON" => ON,
            "OPTIONAL" => OPTIONAL,
            "OR" => OR,
            "PERFORM" => PERFORM,
            "PHYSICAL" => PHYSICAL,
            "PRINT" => PRINT,
            "READ" => READ,
            "REDEFINE" => REDEFINE,
            "REPEAT" => REPEAT,
            "RESET" => RESET,
            "RESULT" => RESULT,
            "RETURN" => RETURN,
            "ROUNDED" => ROUNDED,
            "ROUTINE" => ROUTINE,
            "SPACE" => SPACE,
            "STARTING" => STARTING,
            "STEP" => STEP,
            "STOP" => STOP,
            "SUBROUTINE" => SUBROUTINE,
            "SUBTRACT" => SUBTRACT,
            "THEN" => THEN,
            "THRU" => THRU,
            "TO" => TO,
            "TOP" => TOP,
            "TRUE" => TRUE,
            "UNTIL" => UNTIL,
            "USING" => USING,
            "VALUE" => VALUE,
            "VIEW" => VIEW,
            "WHEN" => WHEN,
            "WHERE" => WHERE,
            "WHILE" => WHILE,
            "WITH" => WITH,
            "WRITE" => WRITE,
            _ => return None,
        };
        Some(kind)
    }

    pub fn category(self) -> TokenCategory {
        use SyntaxKind::*;
        match self {
            EOF | UNTERMINATED_STRING => TokenCategory::Marker,
            STRING | NUMBER | HEX | DATE_LITERAL | TIME_LITERAL | TRUE | FALSE => {
                TokenCategory::Literal
            }
            IDENT | SYSTEM_VARIABLE => TokenCategory::Name,
            SPACING | TABULATION | LPAREN | RPAREN | COMMA | DOT | COLON | SEMICOLON => {
                TokenCategory::Punctuation
            }
            EQUALS | NOT_EQUAL | LESS | LESS_EQUAL | GREATER | GREATER_EQUAL | COLON_EQUALS
            | PLUS | MINUS | ASTERISK | SLASH | POWER => TokenCategory::Operator,
            LOCAL | GLOBAL | PARAMETER | INDEPENDENT => TokenCategory::ScopeKeyword,
            ADD | ALL | AND | ANY | ASSIGN | AT | BOTTOM | BY | CALLNAT | COMPRESS | COMPUTE
            | CONDITION | CONST | DATA | DECIDE | DEFINE | DISPLAY | DIVIDE | DYNAMIC | ELSE
            | END | END_DECIDE | END_DEFINE | END_FIND | END_FOR | END_IF | END_READ
            | END_REPEAT | END_SUBROUTINE | ENDING | EQ | ESCAPE | EVERY | FETCH | FIND
            | FIRST | FOR | FROM | GE | GIVING | GT | IF | IGNORE | INCLUDE | INIT | INITIAL
            | INPUT | INTO | LE | LEAVING | LOGICAL | LT | MAP | MODULE | MOVE | MULTIPLY | NE
            | NO | NOHDR | NONE | NOT | NOTITLE | OF | ON | OPTIONAL | OR | PERFORM
            | PHYSICAL | PRINT | READ | REDEFINE | REPEAT | RESET | RESULT | RETURN
            | ROUNDED | ROUTINE | SPACE | STARTING | STEP | STOP | SUBROUTINE | SUBTRACT
            | THEN | THRU | TO | TOP | UNTIL | USING | VALUE | VIEW | WHEN | WHERE | WHILE
            | WITH | WRITE => TokenCategory::Keyword,
        }
    }

    /// Human readable name for error messages.
    pub fn describe(self) -> &'static str {
        use SyntaxKind::*;
        match self {
            EOF => "end of file",
            UNTERMINATED_STRING => "unterminated string",
            IDENT => "identifier",
            SYSTEM_VARIABLE => "system variable",
            STRING => "string literal",
            NUMBER => "numeric literal",
            HEX => "hex literal",
            DATE_LITERAL => "date literal",
            TIME_LITERAL => "time literal",
            SPACING => "spacing (nX)",
            TABULATION => "tabulation (nT)",
            LPAREN => "'('",
            RPAREN => "')'",
            COMMA => "','",
            DOT => "'.'",
            COLON => "':'",
            SEMICOLON => "';'",
            EQUALS => "'='",
            NOT_EQUAL => "'<>'",
            LESS => "'<'",
            LESS_EQUAL => "'<='",
            GREATER => "'>'",
            GREATER_EQUAL => "'>='",
            COLON_EQUALS => "':='",
            PLUS => "'+'",
            MINUS => "'-'",
            ASTERISK => "'*'",
            SLASH => "'/'",
            POWER => "'**'",
            LOCAL => "LOCAL",
            GLOBAL => "GLOBAL",
            PARAMETER => "PARAMETER",
            INDEPENDENT => "INDEPENDENT",
            ADD => "ADD",
            ALL => "ALL",
            AND => "AND",
            ANY => "ANY",
            ASSIGN => "ASSIGN",
            AT => "AT",
            BOTTOM => "BOTTOM",
            BY => "BY",
            CALLNAT => "CALLNAT",
            COMPRESS => "COMPRESS",
            COMPUTE => "COMPUTE",
            CONDITION => "CONDITION",
            CONST => "CONST",
            DATA => "DATA",
            DECIDE => "DECIDE",
            DEFINE => "DEFINE",
            DISPLAY => "DISPLAY",
            DIVIDE => "DIVIDE",
            DYNAMIC => "DYNAMIC",
            ELSE => "ELSE",
            END => "END",
            END_DECIDE => "END-DECIDE",
            END_DEFINE => "END-DEFINE",
            END_FIND => "END-FIND",
            END_FOR => "END-FOR",
            END_IF => "END-IF",
            END_READ => "END-READ",
            END_REPEAT => "END-REPEAT",
            END_SUBROUTINE => "END-SUBROUTINE",
            ENDING => "ENDING",
            EQ => "EQ",
            ESCAPE => "ESCAPE",
            EVERY => "EVERY",
            FALSE => "FALSE",
            FETCH => "FETCH",
            FIND => "FIND",
            FIRST => "FIRST",
            FOR => "FOR",
            FROM => "FROM",
            GE => "GE",
            GIVING => "GIVING",
            GT => "GT",
            IF => "IF",
            IGNORE => "IGNORE",
            INCLUDE => "INCLUDE",
            INIT => "INIT",
            INITIAL => "INITIAL",
            INPUT => "INPUT",
            INTO => "INTO",
            LE => "LE",
            LEAVING => "LEAVING",
            LOGICAL => "LOGICAL",
            LT => "LT",
            MAP => "MAP",
            MODULE => "MODULE",
            MOVE => "MOVE",
            MULTIPLY => "MULTIPLY",
            NE => "NE",
            NO => "NO",
            NOHDR => "NOHDR",
            NONE => "NONE",
            NOT => "NOT",
            NOTITLE => "NOTITLE",
            OF => "OF",
            ON => "ON",
            OPTIONAL => "OPTIONAL",
            OR => "OR",
            PERFORM => "PERFORM",
            PHYSICAL => "PHYSICAL",
            PRINT => "PRINT",
            READ => "READ",
            REDEFINE => "REDEFINE",
            REPEAT => "REPEAT",
            RESET => "RESET",
            RESULT => "RESULT",
            RETURN => "RETURN",
            ROUNDED => "ROUNDED",
            ROUTINE => "ROUTINE",
            SPACE => "SPACE",
            STARTING => "STARTING",
            STEP => "STEP",
            STOP => "STOP",
            SUBROUTINE => "SUBROUTINE",
            SUBTRACT => "SUBTRACT",
            THEN => "THEN",
            THRU => "THRU",
            TO => "TO",
            TOP => "TOP",
            TRUE => "TRUE",
            UNTIL => "UNTIL",
            USING => "USING",
            VALUE => "VALUE",
            VIEW => "VIEW",
            WHEN => "WHEN",
            WHERE => "WHERE",
            WHILE => "WHILE",
            WITH => "WITH",
            WRITE => "WRITE",
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self.category(),
            TokenCategory::Keyword | TokenCategory::ScopeKeyword
        )
    }

    /// Kinds that open a data block inside `DEFINE DATA`.
    pub fn is_scope_keyword(self) -> bool {
        self.category() == TokenCategory::ScopeKeyword
    }

    /// Keywords that begin a statement.
    pub fn starts_statement(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            ADD | ASSIGN
                | CALLNAT
                | COMPRESS
                | COMPUTE
                | DECIDE
                | DEFINE
                | DISPLAY
                | DIVIDE
                | END
                | ESCAPE
                | FETCH
                | FIND
                | FOR
                | IF
                | IGNORE
                | INCLUDE
                | INPUT
                | MOVE
                | MULTIPLY
                | PERFORM
                | PRINT
                | READ
                | REPEAT
                | RESET
                | STOP
                | SUBTRACT
                | WRITE
        )
    }

    /// `END-xxx` keywords closing a block.
    pub fn closes_block(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            END_DECIDE
                | END_DEFINE
                | END_FIND
                | END_FOR
                | END_IF
                | END_READ
                | END_REPEAT
                | END_SUBROUTINE
        )
    }

    /// Keywords that separate the branches of a block statement.
    pub fn separates_block(self) -> bool {
        use SyntaxKind::*;
        matches!(self, ELSE | VALUE | NONE | ANY | ALL | WHEN | UNTIL | WHILE)
    }

    /// Keywords that may be used as names inside `DEFINE DATA`.
    pub fn can_be_name(self) -> bool {
        use SyntaxKind::*;
        self == IDENT
            || matches!(
                self,
                AT | BOTTOM
                    | CONDITION
                    | DATA
                    | ENDING
                    | EVERY
                    | FIRST
                    | LOGICAL
                    | MAP
                    | MODULE
                    | PHYSICAL
                    | RESULT
                    | ROUTINE
                    | SPACE
                    | STARTING
                    | STEP
                    | TOP
            )
    }

    pub fn is_comparison(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            EQUALS
                | NOT_EQUAL
                | LESS
                | LESS_EQUAL
                | GREATER
                | GREATER_EQUAL
                | EQ
                | NE
                | LT
                | LE
                | GT
                | GE
        )
    }

    pub fn is_literal(self) -> bool {
        self.category() == TokenCategory::Literal
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("local", SyntaxKind::LOCAL)]
    #[case("GLOBAL", SyntaxKind::GLOBAL)]
    #[case("Parameter", SyntaxKind::PARAMETER)]
    #[case("INDEPENDENT", SyntaxKind::INDEPENDENT)]
    #[case("end-if", SyntaxKind::END_IF)]
    #[case("CALLNAT", SyntaxKind::CALLNAT)]
    fn test_keyword_lookup_is_case_insensitive(#[case] text: &str, #[case] expected: SyntaxKind) {
        assert_eq!(SyntaxKind::from_keyword(text), Some(expected));
    }

    #[test]
    fn test_non_keywords() {
        assert_eq!(SyntaxKind::from_keyword("#VAR"), None);
        assert_eq!(SyntaxKind::from_keyword("END-"), None);
    }

    #[test]
    fn test_keyword_text_roundtrips_through_lookup() {
        for kind in [
            SyntaxKind::END_SUBROUTINE,
            SyntaxKind::NOTITLE,
            SyntaxKind::REDEFINE,
            SyntaxKind::INDEPENDENT,
        ] {
            assert_eq!(SyntaxKind::from_keyword(kind.describe()), Some(kind));
        }
    }

    #[test]
    fn test_scope_keywords() {
        assert!(SyntaxKind::LOCAL.is_scope_keyword());
        assert!(SyntaxKind::INDEPENDENT.is_scope_keyword());
        assert!(!SyntaxKind::USING.is_scope_keyword());
        assert!(SyntaxKind::PLUS.category() == TokenCategory::Operator);
    }
}
