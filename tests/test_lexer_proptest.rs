//! Property-based checks of the lexer.
//!
//! - Lexing is deterministic.
//! - Token ranges are ordered, non-overlapping and inside the text.
//! - The last token is always EOF.
//! - Parsing never panics and always returns a unit.
#![cfg(feature = "proptest")]

use natparse::parser::{SyntaxKind, lex, parse};
use natparse::syntax::ast::UnitKind;
use natparse::TextSize;
use proptest::prelude::*;

/// Fragments that look like Natural, glued together by the strategies below.
fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "#[A-Z][A-Z0-9-]{0,8}",
        "\\+[A-Z][A-Z0-9]{0,5}",
        "\\*(DATX|TIMX|TRIM|LENGTH)",
        "[0-9]{1,4}(\\.[0-9]{1,2})?",
        "[0-9]{1,2}[XT]",
        "'[a-z ]{0,6}'",
        Just("MOVE".to_string()),
        Just("TO".to_string()),
        Just("WRITE".to_string()),
        Just("IF".to_string()),
        Just("END-IF".to_string()),
        Just(":=".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("/*".to_string()),
        Just("=".to_string()),
        Just("'".to_string()),
        Just("!".to_string()),
    ]
}

fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::collection::vec(arb_fragment(), 0..8).prop_map(|words| words.join(" ")),
        0..10,
    )
    .prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn lexing_is_deterministic(text in arb_source()) {
        let first = lex(&text);
        let second = lex(&text);
        prop_assert_eq!(first.tokens, second.tokens);
        prop_assert_eq!(first.errors, second.errors);
    }

    #[test]
    fn tokens_are_ordered_and_in_bounds(text in arb_source()) {
        let lexed = lex(&text);
        let end = TextSize::of(text.as_str());
        let mut previous_end = TextSize::from(0);
        for token in &lexed.tokens {
            prop_assert!(token.range.start() >= previous_end, "{:?} overlaps", token);
            prop_assert!(token.range.end() <= end);
            prop_assert_eq!(&text[token.range], token.text);
            previous_end = token.range.end();
        }
        prop_assert_eq!(lexed.tokens.last().map(|t| t.kind), Some(SyntaxKind::EOF));
    }

    #[test]
    fn parsing_arbitrary_text_returns_a_unit(text in arb_source()) {
        let parsed = parse(&text, UnitKind::Program);
        prop_assert!(parsed.unit.range.end() <= TextSize::of(text.as_str()));
    }
}
