//! Directive tokenizer
//!
//! Drives the token matcher through a fixed transition table: the token just
//! consumed decides which kinds may follow. A directive line is tokenized as a
//! whole or not at all.

use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Kinds allowed right after the `#pragma shady:` marker
pub const DIRECTIVE_START: &[TokenKind] = &[
    TokenKind::Import,
    TokenKind::Inline,
    TokenKind::Variant,
    TokenKind::MacroBegin,
    TokenKind::MacroEnd,
    TokenKind::SkipCompilation,
    TokenKind::PrintPath,
];

/// One row of the grammar.
///
/// `within` restricts the row to directives opened by that keyword; rows are
/// searched in order, so restricted rows come before their general fallback.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub after: TokenKind,
    pub within: Option<TokenKind>,
    pub allow: &'static [TokenKind],
}

const fn row(after: TokenKind, allow: &'static [TokenKind]) -> Transition {
    Transition { after, within: None, allow }
}

pub const TRANSITIONS: &[Transition] = &[
    row(TokenKind::Shady, DIRECTIVE_START),
    row(TokenKind::Import, &[TokenKind::OpenParen]),
    row(TokenKind::Inline, &[TokenKind::OpenParen]),
    row(TokenKind::Variant, &[TokenKind::OpenParen]),
    row(TokenKind::MacroBegin, &[TokenKind::Name]),
    Transition {
        after: TokenKind::OpenParen,
        within: Some(TokenKind::Variant),
        allow: &[TokenKind::Argument],
    },
    row(TokenKind::OpenParen, &[TokenKind::Identifier]),
    row(TokenKind::Identifier, &[TokenKind::Dot, TokenKind::CloseParen]),
    row(TokenKind::Dot, &[TokenKind::Identifier]),
    row(TokenKind::Argument, &[TokenKind::Comma, TokenKind::CloseParen]),
    row(TokenKind::Comma, &[TokenKind::Argument]),
    row(TokenKind::CloseParen, &[TokenKind::EndOfLine]),
    row(TokenKind::Name, &[TokenKind::EndOfLine]),
    row(TokenKind::MacroEnd, &[TokenKind::EndOfLine]),
    row(TokenKind::SkipCompilation, &[TokenKind::EndOfLine]),
    row(TokenKind::PrintPath, &[TokenKind::EndOfLine]),
];

/// Look up the kinds allowed after `after` inside a directive opened by `directive`.
///
/// An empty slice ends the directive.
pub fn next_expected(after: TokenKind, directive: Option<TokenKind>) -> &'static [TokenKind] {
    TRANSITIONS
        .iter()
        .find(|t| t.after == after && (t.within.is_none() || t.within == directive))
        .map(|t| t.allow)
        .unwrap_or(&[])
}

/// A directive line that does not follow the grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unexpected expression found! The {expected} is expected after {previous}, got '{found}' instead.")]
pub struct SyntaxError {
    /// Descriptions of every kind that was allowed, joined with "or"
    pub expected: String,
    /// Description of the last token that did match
    pub previous: &'static str,
    /// The input that could not be matched
    pub found: String,
}

impl SyntaxError {
    fn new(expected: &[TokenKind], previous: TokenKind, found: &str) -> Self {
        let expected = expected
            .iter()
            .map(|kind| kind.description())
            .collect::<Vec<_>>()
            .join(" or ");
        Self {
            expected,
            previous: previous.description(),
            found: found.to_string(),
        }
    }
}

/// Tokenize one physical line as a directive.
///
/// Returns `Ok(None)` when the line does not start with the pragma marker
/// (after leading whitespace), so it belongs to the line classifier. The
/// returned tokens exclude the marker itself and the end-of-line token.
pub fn tokenize_directive(line: &str) -> Result<Option<Vec<Token<'_>>>, SyntaxError> {
    let Some(marker) = TokenKind::Shady.matches(line.trim_start()) else {
        return Ok(None);
    };

    let mut tokens = Vec::new();
    let mut previous = marker.kind;
    let mut directive = None;
    let mut remaining = marker.rest.trim_start();
    let mut expected = next_expected(previous, directive);

    while !expected.is_empty() {
        let token = expected
            .iter()
            .find_map(|kind| kind.matches(remaining))
            .ok_or_else(|| SyntaxError::new(expected, previous, remaining))?;

        if directive.is_none() {
            directive = Some(token.kind);
        }
        if token.kind != TokenKind::EndOfLine {
            tokens.push(token);
        }

        remaining = token.rest.trim_start();
        previous = token.kind;
        expected = next_expected(previous, directive);
    }

    Ok(Some(tokens))
}
