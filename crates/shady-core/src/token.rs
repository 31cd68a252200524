//! Token matcher
//!
//! One anchored regular expression per lexical category. Matching a kind
//! against some input either consumes a prefix of it or reports nothing.
//! The directive grammar lives in [`crate::tokenizer`]; the shader-syntax
//! recognizers are used directly by the line classifier.

use std::sync::LazyLock;

use regex::Regex;

/// Every token kind the preprocessor knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Directive keywords
    Shady,
    Import,
    Inline,
    MacroBegin,
    MacroEnd,
    Variant,
    SkipCompilation,
    PrintPath,

    // Directive punctuation
    OpenParen,
    CloseParen,
    Dot,
    Comma,
    EndOfLine,

    // Free-form directive words
    Identifier,
    Argument,
    Name,

    // Shader syntax
    LineComment,
    OpenComment,
    CloseComment,
    OpenBrace,
    CloseBrace,
    Varying,
    Uniform,
    Precision,
    Define,
    Assignment,
    Function,
    EntryPoint,
}

impl TokenKind {
    pub const ALL: [TokenKind; 28] = [
        TokenKind::Shady,
        TokenKind::Import,
        TokenKind::Inline,
        TokenKind::MacroBegin,
        TokenKind::MacroEnd,
        TokenKind::Variant,
        TokenKind::SkipCompilation,
        TokenKind::PrintPath,
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::Dot,
        TokenKind::Comma,
        TokenKind::EndOfLine,
        TokenKind::Identifier,
        TokenKind::Argument,
        TokenKind::Name,
        TokenKind::LineComment,
        TokenKind::OpenComment,
        TokenKind::CloseComment,
        TokenKind::OpenBrace,
        TokenKind::CloseBrace,
        TokenKind::Varying,
        TokenKind::Uniform,
        TokenKind::Precision,
        TokenKind::Define,
        TokenKind::Assignment,
        TokenKind::Function,
        TokenKind::EntryPoint,
    ];

    /// Regular expression recognizing this kind.
    ///
    /// Directive tokens are anchored at the start of the remaining input.
    /// Comment and brace markers may appear anywhere on a line, as may the
    /// assignment, function and entry-point shapes.
    fn pattern(self) -> &'static str {
        match self {
            TokenKind::Shady => r"^#pragma shady:",
            TokenKind::Import => r"^import",
            TokenKind::Inline => r"^inline",
            TokenKind::MacroBegin => r"^macro_begin",
            TokenKind::MacroEnd => r"^macro_end",
            TokenKind::Variant => r"^variant",
            TokenKind::SkipCompilation => r"^skip_compilation",
            TokenKind::PrintPath => r"^print_path",
            TokenKind::OpenParen => r"^\(",
            TokenKind::CloseParen => r"^\)",
            TokenKind::Dot => r"^\.",
            TokenKind::Comma => r"^,",
            TokenKind::EndOfLine => r"^$",
            TokenKind::Identifier | TokenKind::Argument | TokenKind::Name => r"^\w+",
            TokenKind::LineComment => r"^//",
            TokenKind::OpenComment => r"/\*",
            TokenKind::CloseComment => r"\*/",
            TokenKind::OpenBrace => r"\{",
            TokenKind::CloseBrace => r"\}",
            TokenKind::Varying => r"^varying\b",
            TokenKind::Uniform => r"^uniform\b",
            TokenKind::Precision => r"^precision\b",
            TokenKind::Define => r"^#define\b",
            TokenKind::Assignment => r"\w+\s*=",
            TokenKind::Function => r"\w+\s*\(",
            TokenKind::EntryPoint => r"\bmain\s*\(",
        }
    }

    /// Human readable description used in syntax errors
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Shady => "'shady:'",
            TokenKind::Import => "'import'",
            TokenKind::Inline => "'inline'",
            TokenKind::MacroBegin => "'macro_begin'",
            TokenKind::MacroEnd => "'macro_end'",
            TokenKind::Variant => "'variant'",
            TokenKind::SkipCompilation => "'skip_compilation'",
            TokenKind::PrintPath => "'print_path'",
            TokenKind::OpenParen => "open paren '('",
            TokenKind::CloseParen => "close paren ')'",
            TokenKind::Dot => "dot '.'",
            TokenKind::Comma => "comma ','",
            TokenKind::EndOfLine => "nothing (end-of-line)",
            TokenKind::Identifier => "shader/function/variable/macro identifier",
            TokenKind::Argument => "pragma argument",
            TokenKind::Name => "macro name",
            TokenKind::LineComment => "line comment '//'",
            TokenKind::OpenComment => "open comment '/*'",
            TokenKind::CloseComment => "close comment '*/'",
            TokenKind::OpenBrace => "open brace '{'",
            TokenKind::CloseBrace => "close brace '}'",
            TokenKind::Varying => "varying",
            TokenKind::Uniform => "uniform",
            TokenKind::Precision => "precision",
            TokenKind::Define => "#define",
            TokenKind::Assignment => "assignment '='",
            TokenKind::Function => "function()",
            TokenKind::EntryPoint => "main()",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Try to match this kind against `input`.
    ///
    /// For unanchored kinds the returned `rest` is whatever follows the
    /// match, and the text before it is discarded.
    pub fn matches(self, input: &str) -> Option<Token<'_>> {
        let found = MATCHERS[self.index()].find(input)?;
        Some(Token {
            kind: self,
            value: found.as_str(),
            rest: &input[found.end()..],
        })
    }
}

static MATCHERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TokenKind::ALL
        .iter()
        .map(|kind| Regex::new(kind.pattern()).expect("token patterns are valid regexes"))
        .collect()
});

/// A matched token: its kind, the matched text and the input left after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub value: &'a str,
    pub rest: &'a str,
}
